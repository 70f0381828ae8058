fn main() {
    if let Err(err) = campaign_report::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn main() {
    if let Err(e) = drillgate_lib::run() {
        eprintln!("drillgate: {e}");
        std::process::exit(1);
    }
}

fn main() {
    if let Err(err) = bugtriage::cli::run_bug_dataset(std::env::args().skip(1)) {
        eprintln!("bug_dataset: {err}");
        std::process::exit(1);
    }
}

fn main() {
    let code = pythia::cli::run();
    std::process::exit(code as i32);
}

fn main() {
    if let Err(err) = ocelot::cli::main() {
        eprintln!("ERROR: {err}");
        std::process::exit(1);
    }
}

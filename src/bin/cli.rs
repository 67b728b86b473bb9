#[cfg(feature = "cli")]
fn main() {
    chess_engine_core::logger::init_logging("logs/uci.log", "info");
    std::process::exit(chess_engine_core::uci::run());
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("built without the `cli` feature; rebuild with --features cli");
    std::process::exit(1);
}

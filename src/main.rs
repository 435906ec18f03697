#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("This site script is browser-only. Run `trunk serve` or `trunk build --release`.");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    cv_site::frontend::run();
}

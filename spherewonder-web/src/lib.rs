use wasm_bindgen::prelude::*;

mod explorer;

pub use explorer::Explorer;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    _ = console_log::init_with_level(log::Level::Debug);
    log::info!("spherewonder {} loaded", env!("CARGO_PKG_VERSION"));
}

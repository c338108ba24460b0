#![allow(dead_code)]

use wasm_bindgen::prelude::*;

mod bindings;
pub mod dispatcher;
mod reveal;
mod utils;
mod video_element;
mod visibility;

pub use utils::logger::Logger;

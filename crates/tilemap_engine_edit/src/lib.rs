#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::too_many_lines,
    clippy::cast_precision_loss,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::float_cmp,
    clippy::module_name_repetitions
)]
mod editor;
pub use editor::*;

mod item_model;
pub use item_model::*;

mod events;
pub use events::*;

mod options;
pub use options::*;

use i18n_embed::{
    DesktopLanguageRequester,
    fluent::{FluentLanguageLoader, fluent_language_loader},
};
use rust_embed::RustEmbed;

// Re-export the map types the editor API is expressed in
pub use tilemap_engine::{
    EngineResult, FlipDirection, GroupLayer, ImageLayer, Layer, LayerId, LayerKind, LayerType, Map, MapError, MapObject, ObjectGroup, ObjectId, ObjectShape,
    Orientation, PointF, Polygon, Position, Properties, RectF, Rectangle, Region, Result, SharedTileset, Size, SizeF, TileLayer, Tileset,
};

#[derive(RustEmbed)]
#[folder = "i18n"] // path to the compiled localization resources
struct Localizations;

use once_cell::sync::Lazy;
pub static LANGUAGE_LOADER: Lazy<FluentLanguageLoader> = Lazy::new(|| {
    let loader = fluent_language_loader!();
    let requested_languages = DesktopLanguageRequester::requested_languages();
    let _result = i18n_embed::select(&loader, &Localizations, &requested_languages);
    // only affects bundles that are already loaded
    loader.set_use_isolating(false);
    loader
});

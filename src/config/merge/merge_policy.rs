//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Later sources override earlier ones key by key; arrays are replaced, not appended.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("editor.newline_glyph", "\u{b6}")?
        .set_default("editor.unnamed_paste_name", "UNNAMED")?
        .set_default("editor.show_types", false)?
        .set_default(
            "storage.document_extensions",
            vec!["dat", "nbt", "schematic", "dat_mcr", "dat_old", "bpt", "rc"],
        )?
        .set_default("storage.chunk_store_suffix", "chunks")?
        .set_default("logging.level", "warn")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}

//! User-facing text: prompts, table headers and placeholder values.
//!
//! A catalogue can be loaded from JSON; missing keys fall back to English.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::classify::Compression;
use crate::types::{Error, Result};

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum Locale {
    #[default]
    English,
    Russian,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Locale, String> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Locale::English),
            "ru" | "russian" => Ok(Locale::Russian),
            other => Err(format!("unknown locale: {}", other)),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionLabels {
    pub lossy_jpeg: String,
    pub lossless_png: String,
    pub lzw_palette: String,
    pub tiff: String,
    pub uncompressed: String,
    pub rle: String,
    pub unknown: String,
}

impl CompressionLabels {
    pub fn english() -> CompressionLabels {
        CompressionLabels {
            lossy_jpeg: Compression::LossyJpeg.english_label().into(),
            lossless_png: Compression::LosslessPng.english_label().into(),
            lzw_palette: Compression::LzwPalette.english_label().into(),
            tiff: Compression::Tiff.english_label().into(),
            uncompressed: Compression::Uncompressed.english_label().into(),
            rle: Compression::Rle.english_label().into(),
            unknown: Compression::Unknown.english_label().into(),
        }
    }

    pub fn label(&self, c: Compression) -> &str {
        match c {
            Compression::LossyJpeg => &self.lossy_jpeg,
            Compression::LosslessPng => &self.lossless_png,
            Compression::LzwPalette => &self.lzw_palette,
            Compression::Tiff => &self.tiff,
            Compression::Uncompressed => &self.uncompressed,
            Compression::Rle => &self.rle,
            Compression::Unknown => &self.unknown,
        }
    }
}

impl Default for CompressionLabels {
    fn default() -> CompressionLabels {
        CompressionLabels::english()
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    /// Shown when a scan is requested without any accepted file.
    pub select_files_first: String,
    /// Count of accepted files; `{count}` is replaced with the number.
    pub files_selected: String,
    pub analyzing: String,
    pub no_data: String,
    /// Column headers: name, size, resolution, color depth, compression.
    pub headers: [String; 5],
    pub not_specified: String,
    pub tiff_read_error: String,
    pub load_error: String,
    /// Placeholder for values that could not be determined.
    pub unavailable: String,
    pub compression: CompressionLabels,
}

impl Default for Messages {
    fn default() -> Messages {
        Messages::english()
    }
}

impl Messages {
    pub fn english() -> Messages {
        Messages {
            select_files_first: "Select a folder with images first.".into(),
            files_selected: "Files selected: {count}".into(),
            analyzing: "Analyzing files...".into(),
            no_data: "No data.".into(),
            headers: [
                "File name".into(),
                "Size in pixels".into(),
                "Resolution in DPI".into(),
                "Color depth".into(),
                "Compression".into(),
            ],
            not_specified: "not specified".into(),
            tiff_read_error: "TIFF read error".into(),
            load_error: "load error".into(),
            unavailable: "—".into(),
            compression: CompressionLabels::english(),
        }
    }

    pub fn russian() -> Messages {
        Messages {
            select_files_first: "Сначала выберите папку с изображениями.".into(),
            files_selected: "Выбрано файлов: {count}".into(),
            analyzing: "Анализ файлов...".into(),
            no_data: "Нет данных.".into(),
            headers: [
                "Имя файла".into(),
                "Размер (пикс.)".into(),
                "Разрешение (dpi)".into(),
                "Глубина цвета".into(),
                "Сжатие".into(),
            ],
            not_specified: "Не указано".into(),
            tiff_read_error: "Ошибка чтения TIFF".into(),
            load_error: "Ошибка загрузки".into(),
            unavailable: "—".into(),
            compression: CompressionLabels {
                lossy_jpeg: "JPEG (с потерями)".into(),
                lossless_png: "PNG (без потерь)".into(),
                lzw_palette: "LZW (палитра)".into(),
                tiff: "TIFF".into(),
                uncompressed: "Без сжатия".into(),
                rle: "RLE".into(),
                unknown: "Неизвестно".into(),
            },
        }
    }

    pub fn for_locale(locale: Locale) -> Messages {
        match locale {
            Locale::English => Messages::english(),
            Locale::Russian => Messages::russian(),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Messages> {
        serde_json::from_str(s).map_err(|e| invalid_format!("invalid message catalogue: {}", e))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Messages> {
        let text = fs::read_to_string(path).map_err(Error::Io)?;
        Messages::from_json_str(&text)
    }

    pub fn files_selected(&self, count: usize) -> String {
        self.files_selected.replace("{count}", &count.to_string())
    }
}

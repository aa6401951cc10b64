use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// 撮影日時の取得元。EXIF解析ライブラリはこの背後に隠れる。
pub trait TimestampSource {
    /// タグが存在しない場合は `Ok(None)`、コンテナ自体が読めない場合は `Err`。
    fn capture_timestamp(&self, path: &Path) -> Result<Option<NaiveDateTime>>;
}

const DATE_TAG_PRIORITY: &[Tag] = &[Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime];

#[derive(Debug, Clone, Copy, Default)]
pub struct ExifTimestampSource;

impl TimestampSource for ExifTimestampSource {
    fn capture_timestamp(&self, path: &Path) -> Result<Option<NaiveDateTime>> {
        let file = File::open(path)
            .with_context(|| format!("EXIF読み込み対象を開けませんでした: {}", path.display()))?;
        let mut buf = BufReader::new(file);
        let exif = Reader::new()
            .read_from_container(&mut buf)
            .with_context(|| format!("EXIFを解析できませんでした: {}", path.display()))?;

        for tag in DATE_TAG_PRIORITY {
            let Some(field) = exif.get_field(*tag, In::PRIMARY) else {
                continue;
            };
            match decode_datetime(&field.value) {
                Some(datetime) => return Ok(Some(datetime)),
                None => {
                    log::debug!("{}: {} の値を日時として解釈できませんでした", path.display(), tag);
                }
            }
        }

        Ok(None)
    }
}

fn decode_datetime(value: &Value) -> Option<NaiveDateTime> {
    let Value::Ascii(ref lines) = *value else {
        return None;
    };
    let raw = lines.first()?;
    let end = raw
        .iter()
        .rposition(|b| *b != 0 && *b != b' ')
        .map_or(0, |i| i + 1);
    let parsed = exif::DateTime::from_ascii(&raw[..end]).ok()?;

    NaiveDate::from_ymd_opt(
        i32::from(parsed.year),
        u32::from(parsed.month),
        u32::from(parsed.day),
    )?
    .and_hms_opt(
        u32::from(parsed.hour),
        u32::from(parsed.minute),
        u32::from(parsed.second),
    )
}

//! Accessors for the nested sections of a settings tree.
//!
//! The tree root holds a "Title" section describing the scanned source and a
//! "Job" section describing the encode. Every accessor here creates the
//! nodes along its path on first use and returns the existing node on
//! subsequent calls, so callers never have to check for missing sections.

use log::warn;
use serde_json::{Map, Value};

/// A settings tree (or any dictionary node inside one)
pub type Settings = Map<String, Value>;

/// Walk `path` from `tree`, creating empty dictionaries for missing segments.
pub fn dict_at<'a>(tree: &'a mut Settings, path: &[&str]) -> &'a mut Settings {
    let mut node = tree;
    for key in path {
        node = child_dict(node, key);
    }
    node
}

/// Walk `path` from `tree` and return the list stored under `key`,
/// creating the dictionaries and the list as needed.
pub fn list_at<'a>(tree: &'a mut Settings, path: &[&str], key: &str) -> &'a mut Vec<Value> {
    let parent = dict_at(tree, path);
    let slot = parent
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if !slot.is_array() {
        warn!("Replacing non-list value at '{}' with an empty list", key);
        *slot = Value::Array(Vec::new());
    }
    match slot {
        Value::Array(list) => list,
        _ => unreachable!("slot holds a list"),
    }
}

fn child_dict<'a>(parent: &'a mut Settings, key: &str) -> &'a mut Settings {
    let slot = parent
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        warn!("Replacing non-dictionary value at '{}' with an empty dictionary", key);
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot holds a dictionary"),
    }
}

pub fn title_settings(settings: &mut Settings) -> &mut Settings {
    dict_at(settings, &["Title"])
}

/// Audio tracks of the scanned title, if the title has been populated
pub fn title_audio_list(settings: &Settings) -> Option<&Vec<Value>> {
    settings.get("Title")?.get("AudioList")?.as_array()
}

/// Subtitle tracks of the scanned title, if the title has been populated
pub fn title_subtitle_list(settings: &Settings) -> Option<&Vec<Value>> {
    settings.get("Title")?.get("SubtitleList")?.as_array()
}

pub fn job_settings(settings: &mut Settings) -> &mut Settings {
    dict_at(settings, &["Job"])
}

pub fn job_dest_settings(settings: &mut Settings) -> &mut Settings {
    dict_at(settings, &["Job", "Destination"])
}

pub fn job_chapter_list(settings: &mut Settings) -> &mut Vec<Value> {
    list_at(settings, &["Job", "Destination"], "ChapterList")
}

pub fn job_mp4_settings(settings: &mut Settings) -> &mut Settings {
    dict_at(settings, &["Job", "Destination", "Mp4Options"])
}

pub fn job_source_settings(settings: &mut Settings) -> &mut Settings {
    dict_at(settings, &["Job", "Source"])
}

pub fn job_range_settings(settings: &mut Settings) -> &mut Settings {
    dict_at(settings, &["Job", "Source", "Range"])
}

pub fn job_par_settings(settings: &mut Settings) -> &mut Settings {
    dict_at(settings, &["Job", "PAR"])
}

pub fn job_video_settings(settings: &mut Settings) -> &mut Settings {
    dict_at(settings, &["Job", "Video"])
}

pub fn job_audio_settings(settings: &mut Settings) -> &mut Settings {
    dict_at(settings, &["Job", "Audio"])
}

pub fn job_audio_list(settings: &mut Settings) -> &mut Vec<Value> {
    list_at(settings, &["Job", "Audio"], "AudioList")
}

pub fn job_subtitle_settings(settings: &mut Settings) -> &mut Settings {
    dict_at(settings, &["Job", "Subtitle"])
}

pub fn job_subtitle_list(settings: &mut Settings) -> &mut Vec<Value> {
    list_at(settings, &["Job", "Subtitle"], "SubtitleList")
}

/// Subtitle search (foreign audio scan) settings.
///
/// A newly created search section starts with `Enable = false`; an existing
/// one is returned untouched.
pub fn job_subtitle_search(settings: &mut Settings) -> &mut Settings {
    let subtitle = job_subtitle_settings(settings);
    let needs_init = !subtitle.get("Search").is_some_and(Value::is_object);
    let search = child_dict(subtitle, "Search");
    if needs_init {
        search.insert("Enable".to_string(), Value::Bool(false));
    }
    search
}

pub fn job_metadata_settings(settings: &mut Settings) -> &mut Settings {
    dict_at(settings, &["Job", "Metadata"])
}

pub fn job_filter_settings(settings: &mut Settings) -> &mut Settings {
    dict_at(settings, &["Job", "Filters"])
}

pub fn job_filter_list(settings: &mut Settings) -> &mut Vec<Value> {
    list_at(settings, &["Job", "Filters"], "FilterList")
}

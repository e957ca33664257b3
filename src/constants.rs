pub const VIDEO_EXTENSIONS: &[&str] = &["mkv", "mp4", "m4v"];

pub const AUDIO_EXTENSIONS: &[&str] = &["flac", "mka", "opus", "aac"];

pub const SUBTITLE_EXTENSIONS: &[&str] = &["ass"];

pub const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];

/// Clean OP/ED sources are cut 1000ms into the episode timeline, so their
/// audio and subtitles are pulled back by this amount when muxing.
pub const NC_SYNC_OFFSET_MS: i64 = -1000;

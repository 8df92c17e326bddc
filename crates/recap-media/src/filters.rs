//! FFmpeg video filter construction.
//!
//! Every render operation shares the same letterbox geometry so that clips
//! concatenate without re-negotiation: scale to fit, pad to the target frame,
//! force a constant frame rate.

/// Letterbox a frame into `width`x`height` with black bars, no stretching.
pub fn letterbox(width: u32, height: u32) -> String {
    format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2",
        w = width,
        h = height
    )
}

/// Letterbox plus constant frame rate; the normalization filter applied to
/// video and animated-image clips before concatenation.
pub fn normalize(width: u32, height: u32, fps: u32) -> String {
    format!("fps={},{}", fps, letterbox(width, height))
}

/// Pan/zoom (Ken Burns) filter over a letterboxed still.
///
/// The zoom expression interpolates linearly from `zoom_start` to `zoom_end`
/// across the clip, centered on the frame. `d=1` makes each input frame
/// produce one output frame.
pub fn pan_zoom(
    width: u32,
    height: u32,
    fps: u32,
    duration_secs: f64,
    zoom_start: f64,
    zoom_end: f64,
) -> String {
    let frames = (duration_secs * fps as f64).round().max(1.0) as u64;
    let zoom_diff = zoom_end - zoom_start;
    format!(
        "{letterbox},zoompan=z='if(lte(on,1),{zs},{zs}+{zd}*(on-1)/{frames})':d=1:\
         x='(iw-iw/zoom)/2':y='(ih-ih/zoom)/2':s={w}x{h}:fps={fps}",
        letterbox = letterbox(width, height),
        zs = zoom_start,
        zd = zoom_diff,
        frames = frames,
        w = width,
        h = height,
        fps = fps
    )
}

/// Fade in from black and out to black around a clip of `total_secs`.
pub fn fade_in_out(total_secs: f64, fade_secs: f64) -> String {
    format!(
        "fade=t=in:st=0:d={fade},fade=t=out:st={out_start}:d={fade}",
        fade = fade_secs,
        out_start = total_secs - fade_secs
    )
}

/// Draw centered title text (month separator cards).
pub fn centered_text(text: &str, font_size: u32) -> String {
    format!(
        "drawtext=text='{}':fontsize={}:fontcolor=white:x=(w-text_w)/2:y=(h-text_h)/2",
        escape_drawtext(text),
        font_size
    )
}

/// Corner of the frame a caption is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Draw a small caption (the date overlay) in a corner of the frame.
pub fn corner_text(
    text: &str,
    corner: CaptionCorner,
    margin: u32,
    font_size: u32,
    font_color: &str,
) -> String {
    let (x, y) = match corner {
        CaptionCorner::TopLeft => (margin.to_string(), margin.to_string()),
        CaptionCorner::TopRight => (format!("w-text_w-{}", margin), margin.to_string()),
        CaptionCorner::BottomLeft => (margin.to_string(), format!("h-text_h-{}", margin)),
        CaptionCorner::BottomRight => (
            format!("w-text_w-{}", margin),
            format!("h-text_h-{}", margin),
        ),
    };
    format!(
        "drawtext=text='{}':fontsize={}:fontcolor={}:x={}:y={}:\
         shadowcolor=black@0.8:shadowx=2:shadowy=2",
        escape_drawtext(text),
        font_size,
        font_color,
        x,
        y
    )
}

/// Escape text for use inside a drawtext filter argument.
fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace(':', "\\:")
        .replace('%', "\\%")
}

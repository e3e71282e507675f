//! Image size variants understood by the TMDB image CDN.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterSize {
    W92,
    W154,
    W185,
    W342,
    W500,
    W780,
    Original,
}

impl PosterSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            PosterSize::W92 => "w92",
            PosterSize::W154 => "w154",
            PosterSize::W185 => "w185",
            PosterSize::W342 => "w342",
            PosterSize::W500 => "w500",
            PosterSize::W780 => "w780",
            PosterSize::Original => "original",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackdropSize {
    W300,
    W780,
    W1280,
    Original,
}

impl BackdropSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackdropSize::W300 => "w300",
            BackdropSize::W780 => "w780",
            BackdropSize::W1280 => "w1280",
            BackdropSize::Original => "original",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSize {
    W45,
    W185,
    H632,
    Original,
}

impl ProfileSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileSize::W45 => "w45",
            ProfileSize::W185 => "w185",
            ProfileSize::H632 => "h632",
            ProfileSize::Original => "original",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StillSize {
    W92,
    W185,
    W300,
    Original,
}

impl StillSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            StillSize::W92 => "w92",
            StillSize::W185 => "w185",
            StillSize::W300 => "w300",
            StillSize::Original => "original",
        }
    }
}

/// Join an image base, size segment, and TMDB path (which carries its own
/// leading slash) into a full CDN URL.
pub(crate) fn image_url(base: &str, size: &str, path: &str) -> String {
    format!("{}/{}{}", base.trim_end_matches('/'), size, path)
}

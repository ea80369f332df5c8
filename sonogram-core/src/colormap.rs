//! Named colormaps for the spectrogram figure.
//!
//! Each palette is defined by a few anchor colours and expanded into a
//! 256-entry lookup table. Names follow the matplotlib catalog, including the
//! `_r` suffix for reversed maps, so a selection made in any front-end can be
//! passed through verbatim.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownColormap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Palette {
    Viridis,
    Plasma,
    Inferno,
    Magma,
    Cividis,
    Greys,
    Gray,
    Hot,
    Cool,
    Coolwarm,
    Jet,
    Twilight,
    Turbo,
    Blues,
    RdBu,
    Spring,
    Summer,
    Autumn,
    Winter,
    Bone,
}

impl Palette {
    pub const ALL: [Palette; 20] = [
        Palette::Viridis,
        Palette::Plasma,
        Palette::Inferno,
        Palette::Magma,
        Palette::Cividis,
        Palette::Greys,
        Palette::Gray,
        Palette::Hot,
        Palette::Cool,
        Palette::Coolwarm,
        Palette::Jet,
        Palette::Twilight,
        Palette::Turbo,
        Palette::Blues,
        Palette::RdBu,
        Palette::Spring,
        Palette::Summer,
        Palette::Autumn,
        Palette::Winter,
        Palette::Bone,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Palette::Viridis => "viridis",
            Palette::Plasma => "plasma",
            Palette::Inferno => "inferno",
            Palette::Magma => "magma",
            Palette::Cividis => "cividis",
            Palette::Greys => "Greys",
            Palette::Gray => "gray",
            Palette::Hot => "hot",
            Palette::Cool => "cool",
            Palette::Coolwarm => "coolwarm",
            Palette::Jet => "jet",
            Palette::Twilight => "twilight",
            Palette::Turbo => "turbo",
            Palette::Blues => "Blues",
            Palette::RdBu => "RdBu",
            Palette::Spring => "spring",
            Palette::Summer => "summer",
            Palette::Autumn => "autumn",
            Palette::Winter => "winter",
            Palette::Bone => "bone",
        }
    }

    /// Anchor colours as (position, rgb), positions ascending from 0.0 to 1.0.
    fn stops(self) -> &'static [(f32, [u8; 3])] {
        match self {
            Palette::Viridis => &[
                (0.0, [0x44, 0x01, 0x54]),
                (0.1, [0x48, 0x24, 0x75]),
                (0.2, [0x41, 0x44, 0x87]),
                (0.3, [0x35, 0x5f, 0x8d]),
                (0.4, [0x2a, 0x78, 0x8e]),
                (0.5, [0x21, 0x91, 0x8c]),
                (0.6, [0x22, 0xa8, 0x84]),
                (0.7, [0x44, 0xbf, 0x70]),
                (0.8, [0x7a, 0xd1, 0x51]),
                (0.9, [0xbd, 0xdf, 0x26]),
                (1.0, [0xfd, 0xe7, 0x25]),
            ],
            Palette::Plasma => &[
                (0.0, [0x0d, 0x08, 0x87]),
                (0.1, [0x41, 0x04, 0x9d]),
                (0.2, [0x6a, 0x00, 0xa8]),
                (0.3, [0x8f, 0x0d, 0xa4]),
                (0.4, [0xb1, 0x2a, 0x90]),
                (0.5, [0xcc, 0x47, 0x78]),
                (0.6, [0xe1, 0x64, 0x62]),
                (0.7, [0xf2, 0x84, 0x4b]),
                (0.8, [0xfc, 0xa6, 0x36]),
                (0.9, [0xfc, 0xce, 0x25]),
                (1.0, [0xf0, 0xf9, 0x21]),
            ],
            Palette::Inferno => &[
                (0.0, [0x00, 0x00, 0x04]),
                (0.1, [0x16, 0x0b, 0x39]),
                (0.2, [0x42, 0x0a, 0x68]),
                (0.3, [0x6a, 0x17, 0x6e]),
                (0.4, [0x93, 0x26, 0x67]),
                (0.5, [0xbc, 0x37, 0x54]),
                (0.6, [0xdd, 0x51, 0x3a]),
                (0.7, [0xf3, 0x78, 0x19]),
                (0.8, [0xfc, 0xa5, 0x0a]),
                (0.9, [0xf6, 0xd7, 0x46]),
                (1.0, [0xfc, 0xff, 0xa4]),
            ],
            Palette::Magma => &[
                (0.0, [0x00, 0x00, 0x04]),
                (0.1, [0x14, 0x0e, 0x36]),
                (0.2, [0x3b, 0x0f, 0x70]),
                (0.3, [0x64, 0x1a, 0x80]),
                (0.4, [0x8c, 0x29, 0x81]),
                (0.5, [0xb7, 0x37, 0x79]),
                (0.6, [0xde, 0x49, 0x68]),
                (0.7, [0xf7, 0x70, 0x5c]),
                (0.8, [0xfe, 0x9f, 0x6d]),
                (0.9, [0xfe, 0xcf, 0x92]),
                (1.0, [0xfc, 0xfd, 0xbf]),
            ],
            Palette::Cividis => &[
                (0.0, [0x00, 0x22, 0x4e]),
                (0.125, [0x12, 0x35, 0x70]),
                (0.25, [0x3b, 0x49, 0x6c]),
                (0.375, [0x57, 0x5d, 0x6d]),
                (0.5, [0x70, 0x71, 0x73]),
                (0.625, [0x8a, 0x86, 0x78]),
                (0.75, [0xa5, 0x9c, 0x74]),
                (0.875, [0xc3, 0xb3, 0x69]),
                (1.0, [0xfe, 0xe8, 0x38]),
            ],
            Palette::Greys => &[(0.0, [0xff, 0xff, 0xff]), (1.0, [0x00, 0x00, 0x00])],
            Palette::Gray => &[(0.0, [0x00, 0x00, 0x00]), (1.0, [0xff, 0xff, 0xff])],
            Palette::Hot => &[
                (0.0, [0x0b, 0x00, 0x00]),
                (0.365, [0xff, 0x00, 0x00]),
                (0.746, [0xff, 0xff, 0x00]),
                (1.0, [0xff, 0xff, 0xff]),
            ],
            Palette::Cool => &[(0.0, [0x00, 0xff, 0xff]), (1.0, [0xff, 0x00, 0xff])],
            Palette::Coolwarm => &[
                (0.0, [0x3b, 0x4c, 0xc0]),
                (0.5, [0xdd, 0xdd, 0xdd]),
                (1.0, [0xb4, 0x04, 0x26]),
            ],
            Palette::Jet => &[
                (0.0, [0x00, 0x00, 0x80]),
                (0.11, [0x00, 0x00, 0xff]),
                (0.34, [0x00, 0xff, 0xff]),
                (0.65, [0xff, 0xff, 0x00]),
                (0.89, [0xff, 0x00, 0x00]),
                (1.0, [0x80, 0x00, 0x00]),
            ],
            // Cyclic: both ends are the same pale lilac.
            Palette::Twilight => &[
                (0.0, [0xe2, 0xd9, 0xe2]),
                (0.125, [0xa6, 0xbd, 0xd2]),
                (0.25, [0x6a, 0x8b, 0xc1]),
                (0.375, [0x5a, 0x4c, 0xa8]),
                (0.5, [0x2f, 0x14, 0x36]),
                (0.625, [0x7b, 0x24, 0x4f]),
                (0.75, [0xb4, 0x5a, 0x48]),
                (0.875, [0xd4, 0xa0, 0x8c]),
                (1.0, [0xe2, 0xd9, 0xe2]),
            ],
            Palette::Turbo => &[
                (0.0, [0x30, 0x12, 0x3b]),
                (0.1, [0x49, 0x58, 0xdd]),
                (0.2, [0x2f, 0x9e, 0xf5]),
                (0.3, [0x27, 0xd7, 0xc3]),
                (0.4, [0x4e, 0xf9, 0x83]),
                (0.5, [0x96, 0xfa, 0x50]),
                (0.6, [0xdf, 0xdc, 0x32]),
                (0.7, [0xff, 0xa3, 0x23]),
                (0.8, [0xf4, 0x5c, 0x17]),
                (0.9, [0xb8, 0x20, 0x08]),
                (1.0, [0x7a, 0x04, 0x03]),
            ],
            Palette::Blues => &[
                (0.0, [0xf7, 0xfb, 0xff]),
                (0.125, [0xde, 0xeb, 0xf7]),
                (0.25, [0xc6, 0xdb, 0xef]),
                (0.375, [0x9e, 0xca, 0xe1]),
                (0.5, [0x6b, 0xae, 0xd6]),
                (0.625, [0x42, 0x92, 0xc6]),
                (0.75, [0x21, 0x71, 0xb5]),
                (0.875, [0x08, 0x51, 0x9c]),
                (1.0, [0x08, 0x30, 0x6b]),
            ],
            Palette::RdBu => &[
                (0.0, [0x67, 0x00, 0x1f]),
                (0.1, [0xb2, 0x18, 0x2b]),
                (0.2, [0xd6, 0x60, 0x4d]),
                (0.3, [0xf4, 0xa5, 0x82]),
                (0.4, [0xfd, 0xdb, 0xc7]),
                (0.5, [0xf7, 0xf7, 0xf7]),
                (0.6, [0xd1, 0xe5, 0xf0]),
                (0.7, [0x92, 0xc5, 0xde]),
                (0.8, [0x43, 0x93, 0xc3]),
                (0.9, [0x21, 0x66, 0xac]),
                (1.0, [0x05, 0x30, 0x61]),
            ],
            Palette::Spring => &[(0.0, [0xff, 0x00, 0xff]), (1.0, [0xff, 0xff, 0x00])],
            Palette::Summer => &[(0.0, [0x00, 0x80, 0x66]), (1.0, [0xff, 0xff, 0x66])],
            Palette::Autumn => &[(0.0, [0xff, 0x00, 0x00]), (1.0, [0xff, 0xff, 0x00])],
            Palette::Winter => &[(0.0, [0x00, 0x00, 0xff]), (1.0, [0x00, 0xff, 0x80])],
            Palette::Bone => &[
                (0.0, [0x00, 0x00, 0x00]),
                (0.365, [0x51, 0x51, 0x71]),
                (0.746, [0xa6, 0xc6, 0xc6]),
                (1.0, [0xff, 0xff, 0xff]),
            ],
        }
    }
}

/// A palette, optionally reversed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Colormap {
    pub palette: Palette,
    pub reversed: bool,
}

impl Default for Colormap {
    fn default() -> Self {
        Colormap::new(Palette::Viridis)
    }
}

impl Colormap {
    pub const fn new(palette: Palette) -> Self {
        Self {
            palette,
            reversed: false,
        }
    }

    pub const fn reversed(palette: Palette) -> Self {
        Self {
            palette,
            reversed: true,
        }
    }

    /// Every supported colormap in presentation order: all forward palettes,
    /// then their reversed forms.
    pub fn catalog() -> Vec<Colormap> {
        Palette::ALL
            .iter()
            .map(|&p| Colormap::new(p))
            .chain(Palette::ALL.iter().map(|&p| Colormap::reversed(p)))
            .collect()
    }

    /// Catalog names, as shown in a picker.
    pub fn names() -> Vec<String> {
        Self::catalog().iter().map(|c| c.to_string()).collect()
    }

    /// Colour for an intensity in `[0, 1]` (clamped).
    pub fn color_at(&self, t: f32) -> [u8; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let t = if self.reversed { 1.0 - t } else { t };
        interpolate(self.palette.stops(), t)
    }

    pub fn lut(&self) -> ColorLut {
        let stops = self.palette.stops();
        let mut table = [[0u8; 3]; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = interpolate(stops, i as f32 / 255.0);
        }
        if self.reversed {
            table.reverse();
        }
        ColorLut { table }
    }
}

fn interpolate(stops: &[(f32, [u8; 3])], t: f32) -> [u8; 3] {
    let upper = stops
        .iter()
        .position(|&(pos, _)| pos >= t)
        .unwrap_or(stops.len() - 1);
    if upper == 0 {
        return stops[0].1;
    }
    let (p0, c0) = stops[upper - 1];
    let (p1, c1) = stops[upper];
    let f = if p1 > p0 { (t - p0) / (p1 - p0) } else { 0.0 };
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * f).round() as u8;
    [mix(c0[0], c1[0]), mix(c0[1], c1[1]), mix(c0[2], c1[2])]
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.palette.name())?;
        if self.reversed {
            f.write_str("_r")?;
        }
        Ok(())
    }
}

impl FromStr for Colormap {
    type Err = UnknownColormap;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, reversed) = match s.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (s, false),
        };
        Palette::ALL
            .iter()
            .find(|p| p.name() == base)
            .map(|&palette| Colormap { palette, reversed })
            .ok_or_else(|| UnknownColormap(s.to_string()))
    }
}

impl Serialize for Colormap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Colormap {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// 256-entry colour table for one colormap.
pub struct ColorLut {
    table: [[u8; 3]; 256],
}

impl ColorLut {
    #[inline]
    pub fn apply(&self, index: u8) -> [u8; 3] {
        self.table[index as usize]
    }

    /// Colour for a dB value within `[min_db, max_db]`.
    pub fn db_color(&self, db: f32, min_db: f32, max_db: f32) -> [u8; 3] {
        self.apply(db_to_index(db, min_db, max_db))
    }
}

/// Map a dB value to a LUT index. A degenerate range maps to the top entry.
pub fn db_to_index(db: f32, min_db: f32, max_db: f32) -> u8 {
    let range = max_db - min_db;
    if range <= 0.0 || !range.is_finite() {
        return 255;
    }
    let t = ((db - min_db) / range).clamp(0.0, 1.0);
    (t * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_names_round_trip() {
        let catalog = Colormap::catalog();
        assert_eq!(catalog.len(), 2 * Palette::ALL.len());
        for cmap in catalog {
            let name = cmap.to_string();
            assert_eq!(name.parse::<Colormap>().unwrap(), cmap, "{name}");
        }
    }

    #[test]
    fn default_is_viridis() {
        assert_eq!(Colormap::default().to_string(), "viridis");
        assert_eq!(Colormap::names()[0], "viridis");
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert_eq!(
            "not_a_map".parse::<Colormap>(),
            Err(UnknownColormap("not_a_map".into()))
        );
        // Names are case-sensitive, as in the catalog.
        assert!("Viridis".parse::<Colormap>().is_err());
        assert!("Greys".parse::<Colormap>().is_ok());
    }

    #[test]
    fn endpoints_match_anchor_colours() {
        let viridis = Colormap::new(Palette::Viridis);
        assert_eq!(viridis.color_at(0.0), [0x44, 0x01, 0x54]);
        assert_eq!(viridis.color_at(1.0), [0xfd, 0xe7, 0x25]);
        assert_eq!(viridis.color_at(-3.0), [0x44, 0x01, 0x54]);
        assert_eq!(viridis.color_at(f32::NAN), [0x44, 0x01, 0x54]);

        let gray = Colormap::new(Palette::Gray);
        assert_eq!(gray.color_at(0.5), [128, 128, 128]);
    }

    #[test]
    fn matplotlib_names_resolve() {
        for name in [
            "twilight", "turbo", "Blues", "RdBu", "spring", "summer", "autumn", "winter", "bone",
            "RdBu_r", "bone_r",
        ] {
            let cmap: Colormap = name.parse().unwrap();
            assert_eq!(cmap.to_string(), name);
        }
        assert!(Colormap::names().contains(&"twilight_r".to_string()));
    }

    #[test]
    fn twilight_wraps_around() {
        let twilight = Colormap::new(Palette::Twilight);
        assert_eq!(twilight.color_at(0.0), twilight.color_at(1.0));
        let [r, g, b] = twilight.color_at(0.5);
        assert!(r < 0x40 && g < 0x40 && b < 0x40, "{:?}", [r, g, b]);
    }

    #[test]
    fn simple_maps_hit_their_corners() {
        assert_eq!(Colormap::new(Palette::Spring).color_at(0.0), [0xff, 0x00, 0xff]);
        assert_eq!(Colormap::new(Palette::Autumn).color_at(1.0), [0xff, 0xff, 0x00]);
        assert_eq!(Colormap::new(Palette::Winter).color_at(0.5), [0x00, 0x80, 0xc0]);
        assert_eq!(Colormap::new(Palette::Bone).color_at(1.0), [0xff, 0xff, 0xff]);
        assert_eq!(Colormap::new(Palette::Blues).color_at(0.0), [0xf7, 0xfb, 0xff]);
    }

    #[test]
    fn reversed_flips_the_gradient() {
        let fwd = Colormap::new(Palette::Magma).lut();
        let rev = Colormap::reversed(Palette::Magma).lut();
        for i in 0..=255u8 {
            assert_eq!(fwd.apply(i), rev.apply(255 - i));
        }
    }

    #[test]
    fn db_maps_onto_lut_range() {
        assert_eq!(db_to_index(0.0, -80.0, 0.0), 255);
        assert_eq!(db_to_index(-80.0, -80.0, 0.0), 0);
        assert_eq!(db_to_index(-100.0, -80.0, 0.0), 0);
        assert_eq!(db_to_index(-40.0, -80.0, 0.0), 128);
        assert_eq!(db_to_index(0.0, 0.0, 0.0), 255);
    }

    #[test]
    fn parses_reversed_suffix() {
        let cmap: Colormap = "inferno_r".parse().unwrap();
        assert_eq!(cmap, Colormap::reversed(Palette::Inferno));
        assert_eq!(cmap.to_string(), "inferno_r");
    }
}

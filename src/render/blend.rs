use std::str::FromStr;

use crate::foundation::error::{JayverseError, JayverseResult};
use crate::foundation::math::mul_div255_u8;

/// Premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// How a drawn source combines with what is already on the surface.
///
/// Names follow canvas `globalCompositeOperation`; `source-over` maps to [`BlendMode::Normal`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    /// Plain source-over.
    #[default]
    #[serde(alias = "source-over")]
    Normal,
    /// `multiply`
    Multiply,
    /// `screen`
    Screen,
    /// `overlay`
    Overlay,
    /// `darken`
    Darken,
    /// `lighten`
    Lighten,
    /// `color-dodge`
    ColorDodge,
    /// `color-burn`
    ColorBurn,
    /// `hard-light`
    HardLight,
    /// `soft-light`
    SoftLight,
    /// `difference`
    Difference,
    /// `exclusion`
    Exclusion,
    /// `hue`
    Hue,
    /// `saturation`
    Saturation,
    /// `color`
    Color,
    /// `luminosity`
    Luminosity,
}

impl BlendMode {
    /// Every supported mode, in menu order.
    pub const ALL: [BlendMode; 16] = [
        Self::Normal,
        Self::Multiply,
        Self::Screen,
        Self::Overlay,
        Self::Darken,
        Self::Lighten,
        Self::ColorDodge,
        Self::ColorBurn,
        Self::HardLight,
        Self::SoftLight,
        Self::Difference,
        Self::Exclusion,
        Self::Hue,
        Self::Saturation,
        Self::Color,
        Self::Luminosity,
    ];

    /// Canvas operation name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "source-over",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::Darken => "darken",
            Self::Lighten => "lighten",
            Self::ColorDodge => "color-dodge",
            Self::ColorBurn => "color-burn",
            Self::HardLight => "hard-light",
            Self::SoftLight => "soft-light",
            Self::Difference => "difference",
            Self::Exclusion => "exclusion",
            Self::Hue => "hue",
            Self::Saturation => "saturation",
            Self::Color => "color",
            Self::Luminosity => "luminosity",
        }
    }
}

impl std::fmt::Display for BlendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlendMode {
    type Err = JayverseError;

    fn from_str(s: &str) -> JayverseResult<Self> {
        let s = s.trim().to_ascii_lowercase();
        if s == "normal" {
            return Ok(Self::Normal);
        }
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| JayverseError::validation(format!("unknown blend mode '{s}'")))
    }
}

/// Premultiplied source-over with an extra opacity factor.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Composite `src` onto `dst` (equal-length premultiplied RGBA8) with `mode` and `opacity`.
pub fn composite_in_place(
    dst: &mut [u8],
    src: &[u8],
    opacity: f32,
    mode: BlendMode,
) -> JayverseResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(JayverseError::render(
            "composite_in_place expects equal-length rgba8 buffers",
        ));
    }

    // Mode dispatch happens once per call; each arm gets its own monomorphized kernel.
    match mode {
        BlendMode::Normal => {
            for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
                d.copy_from_slice(&out);
            }
        }
        BlendMode::Multiply => separable(dst, src, opacity, |s, d| s * d),
        BlendMode::Screen => separable(dst, src, opacity, |s, d| s + d - s * d),
        BlendMode::Overlay => separable(dst, src, opacity, |s, d| hard_light(d, s)),
        BlendMode::Darken => separable(dst, src, opacity, |s, d| s.min(d)),
        BlendMode::Lighten => separable(dst, src, opacity, |s, d| s.max(d)),
        BlendMode::ColorDodge => separable(dst, src, opacity, |s, d| {
            if d <= 0.0 {
                0.0
            } else if s >= 1.0 {
                1.0
            } else {
                (d / (1.0 - s)).min(1.0)
            }
        }),
        BlendMode::ColorBurn => separable(dst, src, opacity, |s, d| {
            if d >= 1.0 {
                1.0
            } else if s <= 0.0 {
                0.0
            } else {
                1.0 - ((1.0 - d) / s).min(1.0)
            }
        }),
        BlendMode::HardLight => separable(dst, src, opacity, hard_light),
        BlendMode::SoftLight => separable(dst, src, opacity, |s, d| {
            if s <= 0.5 {
                d - (1.0 - 2.0 * s) * d * (1.0 - d)
            } else {
                let g = if d <= 0.25 {
                    ((16.0 * d - 12.0) * d + 4.0) * d
                } else {
                    d.sqrt()
                };
                d + (2.0 * s - 1.0) * (g - d)
            }
        }),
        BlendMode::Difference => separable(dst, src, opacity, |s, d| (d - s).abs()),
        BlendMode::Exclusion => separable(dst, src, opacity, |s, d| d + s - 2.0 * d * s),
        BlendMode::Hue => blend_kernel(dst, src, opacity, |s, d| {
            set_lum(set_sat(s, sat(d)), lum(d))
        }),
        BlendMode::Saturation => blend_kernel(dst, src, opacity, |s, d| {
            set_lum(set_sat(d, sat(s)), lum(d))
        }),
        BlendMode::Color => blend_kernel(dst, src, opacity, |s, d| set_lum(s, lum(d))),
        BlendMode::Luminosity => blend_kernel(dst, src, opacity, |s, d| set_lum(d, lum(s))),
    }
    Ok(())
}

fn hard_light(s: f32, d: f32) -> f32 {
    if s <= 0.5 {
        2.0 * s * d
    } else {
        1.0 - 2.0 * (1.0 - s) * (1.0 - d)
    }
}

#[inline(always)]
fn separable<F>(dst: &mut [u8], src: &[u8], opacity: f32, f: F)
where
    F: Fn(f32, f32) -> f32,
{
    blend_kernel(dst, src, opacity, |s, d| {
        [f(s[0], d[0]), f(s[1], d[1]), f(s[2], d[2])]
    });
}

#[inline(always)]
fn blend_kernel<F>(dst: &mut [u8], src: &[u8], opacity: f32, blend_fn: F)
where
    F: Fn([f32; 3], [f32; 3]) -> [f32; 3],
{
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return;
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        // Source-over with the blend applied to unpremultiplied colors:
        // out_a = sa + da * (1 - sa)
        // out_p = sp * (1 - da) + dp * (1 - sa) + B(sc, dc) * sa * da
        let sa = (f32::from(s[3]) / 255.0) * opacity;
        let da = f32::from(d[3]) / 255.0;

        let mut sp = [0.0f32; 3];
        let mut dp = [0.0f32; 3];
        let mut sc = [0.0f32; 3];
        let mut dc = [0.0f32; 3];
        for i in 0..3 {
            sp[i] = (f32::from(s[i]) / 255.0) * opacity;
            dp[i] = f32::from(d[i]) / 255.0;
            sc[i] = if sa > 0.0 { (sp[i] / sa).clamp(0.0, 1.0) } else { 0.0 };
            dc[i] = if da > 0.0 { (dp[i] / da).clamp(0.0, 1.0) } else { 0.0 };
        }

        let b = blend_fn(sc, dc);
        let inv_sa = 1.0 - sa;
        let inv_da = 1.0 - da;
        let out_a = (sa + da * inv_sa).clamp(0.0, 1.0);
        for i in 0..3 {
            let bi = b[i].clamp(0.0, 1.0);
            let v = (sp[i] * inv_da + dp[i] * inv_sa + bi * sa * da).clamp(0.0, out_a);
            d[i] = (v * 255.0).round() as u8;
        }
        d[3] = (out_a * 255.0).round() as u8;
    }
}

fn lum(c: [f32; 3]) -> f32 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn clip_color(c: [f32; 3]) -> [f32; 3] {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    let mut out = c;
    for v in &mut out {
        if n < 0.0 && l - n > 0.0 {
            *v = l + (*v - l) * l / (l - n);
        }
        if x > 1.0 && x - l > 0.0 {
            *v = l + (*v - l) * (1.0 - l) / (x - l);
        }
    }
    out
}

fn set_lum(c: [f32; 3], l: f32) -> [f32; 3] {
    let d = l - lum(c);
    clip_color([c[0] + d, c[1] + d, c[2] + d])
}

fn sat(c: [f32; 3]) -> f32 {
    c[0].max(c[1]).max(c[2]) - c[0].min(c[1]).min(c[2])
}

fn set_sat(c: [f32; 3], s: f32) -> [f32; 3] {
    let max = c[0].max(c[1]).max(c[2]);
    let min = c[0].min(c[1]).min(c[2]);
    if max <= min {
        return [0.0; 3];
    }
    let mut out = [0.0f32; 3];
    for i in 0..3 {
        out[i] = if c[i] >= max {
            s
        } else if c[i] <= min {
            0.0
        } else {
            (c[i] - min) * s / (max - min)
        };
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;

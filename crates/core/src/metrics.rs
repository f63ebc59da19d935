/// Advance-width measurement for one font.
pub trait FontMetrics {
    fn font_name(&self) -> &str;

    /// Width of `text` in page units when drawn at `font_size`.
    fn measure_width(&self, text: &str, font_size: f32) -> f32;
}

impl<M: FontMetrics + ?Sized> FontMetrics for &M {
    fn font_name(&self) -> &str {
        (**self).font_name()
    }

    fn measure_width(&self, text: &str, font_size: f32) -> f32 {
        (**self).measure_width(text, font_size)
    }
}

/// Built-in Helvetica (standard 14 font) metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct Helvetica;

const HELVETICA_DEFAULT_WIDTH: u16 = 556;

// AFM advance widths for 0x20..=0x7E, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

impl Helvetica {
    pub const NAME: &'static str = "Helvetica";

    fn char_width(ch: char) -> u16 {
        match ch {
            ' '..='~' => HELVETICA_WIDTHS[ch as usize - 0x20],
            _ => HELVETICA_DEFAULT_WIDTH,
        }
    }
}

impl FontMetrics for Helvetica {
    fn font_name(&self) -> &str {
        Self::NAME
    }

    fn measure_width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|ch| u32::from(Self::char_width(ch))).sum();
        units as f32 * font_size / 1000.0
    }
}

/// Illustrative per-crop figures shown next to each suggestion.
///
/// These are not agronomic estimates. They are derived from the crop name so
/// the same crop always renders the same chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropMetrics {
    pub yield_units_per_acre: u32,
    pub profit_per_acre: u32,
    pub water_need_index: u32,
    pub nutrient_need_index: u32,
}

impl CropMetrics {
    pub fn rows(&self) -> [(&'static str, u32); 4] {
        [
            ("Est. Yield (units/acre)", self.yield_units_per_acre),
            ("Est. Profit ($/acre)", self.profit_per_acre),
            ("Water Need (index)", self.water_need_index),
            ("Nutrient Need (index)", self.nutrient_need_index),
        ]
    }
}

/// 32-bit `h * 31 + c` string hash over UTF-16 code units.
pub fn crop_name_hash(crop: &str) -> i32 {
    crop.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
    })
}

pub fn chart_metrics(crop: &str) -> CropMetrics {
    // i32::MIN has no i32 absolute value
    let h = i64::from(crop_name_hash(crop)).unsigned_abs();
    let bucket = |modulus: u64| (h % modulus) as u32;

    CropMetrics {
        yield_units_per_acre: 50 + bucket(50),
        profit_per_acre: 1000 + bucket(1000),
        water_need_index: 30 + bucket(40),
        nutrient_need_index: 40 + bucket(50),
    }
}

/// Horizontal bar scaled against `max`, for terminal charts.
pub fn bar(value: u32, max: u32, width: usize) -> String {
    if max == 0 || width == 0 {
        return String::new();
    }
    let filled = ((value.min(max) as f64 / max as f64) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

//! 画質指標の表示フォーマット

use crate::types::QualityMetrics;

/// 小数点以下 `decimals` 桁の固定小数表記
///
/// ちょうど中間の値は絶対値の大きい方へ丸める（24.25 → "24.3"）。`-0.0` は "0.0" と表記する。
pub fn format_fixed(value: f64, decimals: usize) -> String {
    // -0.0 を 0.0 に寄せる
    let value = if value == 0.0 { 0.0 } else { value };

    match round_half_away(value.abs(), decimals) {
        Some(digits) if value < 0.0 => format!("-{}", digits),
        Some(digits) => digits,
        None => format!("{:.*}", decimals, value),
    }
}

/// `abs` が10進でちょうど中間の値なら、切り上げた表記を返す
///
/// 中間値 (2k+1) / (2·10^d) が2進で表せるのは `abs · 2^(d+1)` が奇数の整数になるときだけ。
fn round_half_away(abs: f64, decimals: usize) -> Option<String> {
    if decimals > 20 || !abs.is_finite() {
        return None;
    }

    let twice = abs * 2f64.powi(decimals as i32 + 1);
    if twice.fract() != 0.0 || twice % 2.0 != 1.0 {
        return None;
    }

    let scaled = (twice as u128 * 5u128.pow(decimals as u32) + 1) / 2;
    let digits = format!("{:0>width$}", scaled, width = decimals + 1);
    if decimals == 0 {
        return Some(digits);
    }
    let (int_part, frac_part) = digits.split_at(digits.len() - decimals);
    Some(format!("{}.{}", int_part, frac_part))
}

/// 結果パネルの指標カード1枚分
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRow {
    pub name: &'static str,
    pub value: String,
    pub description: &'static str,
}

impl QualityMetrics {
    /// SSIM / UQIM / PSNR の表示行
    pub fn display_rows(&self) -> [MetricRow; 3] {
        [
            MetricRow {
                name: "SSIM",
                value: format_fixed(self.ssim, 3),
                description: "Structural Similarity",
            },
            MetricRow {
                name: "UQIM",
                value: format_fixed(self.uqi, 3),
                description: "Underwater Quality",
            },
            MetricRow {
                name: "PSNR",
                value: format!("{} dB", format_fixed(self.psnr, 1)),
                description: "Peak Signal-to-Noise",
            },
        ]
    }
}

//! Canned interpretation texts for reduced numbers.
//!
//! The table covers the nine single digits and all three master numbers.
//! Earlier deployments shipped a shorter table without 22 and 33; the
//! complete variant is the canonical one here, and the shorter table is not
//! reproduced. Numbers outside the table (notably the 0 produced by the
//! reduction edge case) fall back to [`DEFAULT_INTERPRETATION`] instead of
//! failing the request.

/// Fallback text for numbers without a table entry.
pub const DEFAULT_INTERPRETATION: &str = "No interpretation available.";

/// Look up the fixed interpretation text for a reduced number.
pub fn interpretation(number: u32) -> &'static str {
    match number {
        1 => "Leadership, independence, and pioneering. Represents new beginnings and individuality.",
        2 => "Harmony, balance, cooperation, and diplomacy. Symbolizes sensitivity in relationships and partnerships.",
        3 => "Creativity, communication, and self-expression. A joyful, social, and artistic energy.",
        4 => "Stability, order, discipline, and hard work. The number of reliability and solid foundations.",
        5 => "Change, freedom, adventure, and versatility. Embraces the mobility that life brings.",
        6 => "Responsibility, family, love, and service. Represents strong ties to community and home.",
        7 => "Analysis, inner wisdom, and spirituality. Indicates a researcher with deep thinking and intuition.",
        8 => "Power, success, materialism, and authority. Symbolizes competence in financial and worldly matters.",
        9 => "Humanism, compassion, completion, and universality. Represents the desire to serve humanity.",
        11 => "High intuition, idealism, and enlightenment. Carries the potential of a spiritual guide.",
        22 => "The master builder: practical vision, discipline, and large-scale achievement. Turns ambitious ideals into lasting structures.",
        33 => "The master teacher: selfless service, healing, and unconditional compassion. Represents guidance devoted to uplifting others.",
        _ => DEFAULT_INTERPRETATION,
    }
}

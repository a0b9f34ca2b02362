pub struct Icons;

impl Icons {
    pub const SCISSORS: &str = "✂️";
    pub const SEARCH: &str = "🔍";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const FILE: &str = "📄";
    pub const PUZZLE: &str = "🧩";
    pub const CLOCK: &str = "⏱️";
}

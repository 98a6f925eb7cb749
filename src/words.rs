use rand::seq::SliceRandom;

/// Fixed pool of secret words. Short, concrete, drawable nouns.
pub const WORDS: &[&str] = &[
    "apple", "anchor", "balloon", "banana", "bicycle", "bridge", "butterfly",
    "cactus", "camera", "candle", "castle", "caterpillar", "cloud", "compass",
    "crown", "dolphin", "dragon", "drum", "elephant", "envelope", "feather",
    "fireworks", "flamingo", "fountain", "ghost", "giraffe", "guitar",
    "hammer", "hamburger", "helicopter", "igloo", "island", "jellyfish",
    "kangaroo", "kite", "ladder", "lighthouse", "magnet", "mermaid",
    "mountain", "mushroom", "octopus", "owl", "palm tree", "parachute",
    "penguin", "piano", "pirate", "pizza", "pyramid", "rainbow", "robot",
    "rocket", "sandcastle", "saxophone", "scarecrow", "snowman", "spider",
    "submarine", "telescope", "tornado", "trampoline", "turtle", "umbrella",
    "unicorn", "volcano", "waterfall", "whale", "windmill", "wizard",
];

/// Pick a random secret word for a new round.
pub fn random_word() -> &'static str {
    WORDS.choose(&mut rand::thread_rng()).copied().unwrap_or("apple")
}

pub mod guess;
pub mod round;
pub mod stroke;

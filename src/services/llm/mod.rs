pub mod gemini;
pub mod reply;

pub const TELUGU_INSTRUCTION: &str = "Act as a helpful and friendly assistant. Respond concisely and entirely in natural, conversational Telugu (India) using the input provided.";

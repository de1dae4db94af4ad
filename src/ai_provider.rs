use clap::ValueEnum;
use emotion_eval_common::ModelVendor;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AiProvider {
    #[value(name = "openai")]
    OpenAi,
    Gemini,
}

impl AiProvider {
    pub fn vendor(&self) -> ModelVendor {
        match self {
            AiProvider::OpenAi => ModelVendor::OpenAi,
            AiProvider::Gemini => ModelVendor::Gemini,
        }
    }
}

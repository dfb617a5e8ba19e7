//! Prompt layer for Huddle.
//!
//! - [`template`]: `{{name}}` substitution over an explicit variable set
//! - [`store`]: named fragments read from disk, cached per process
//! - [`assembler`]: shared context + feature fragments → system/user prompts

pub mod assembler;
pub mod store;
pub mod template;

pub use assembler::{
    AdaptRequest, AssembledPrompt, DebriefRequest, Feature, FeatureRequest, ProgramRequest,
    PromptAssembler, SequenceRequest, SequenceType,
};
pub use store::{DirectorySource, FragmentSource, TemplateStore};
pub use template::Variables;

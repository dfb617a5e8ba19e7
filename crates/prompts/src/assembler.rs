//! Prompt assembly for the generation features.
//!
//! Every feature is backed by three fragments: the common `shared-context`,
//! `<feature>-system` and `<feature>-user`. The system prompt is the shared
//! context and the feature system fragment joined by [`SYSTEM_SEPARATOR`];
//! the user prompt is the user fragment with the request's variables filled in.

use huddle_catalog::ActivityCatalog;
use huddle_core::error::PromptError;
use huddle_core::metadata::{self, CategoryMap};
use huddle_core::provider::ProviderRequest;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::store::TemplateStore;
use crate::template::{self, Variables};

/// Fragment prepended to every feature's system prompt.
pub const SHARED_CONTEXT: &str = "shared-context";

pub const SYSTEM_SEPARATOR: &str = "\n\n---\n\n";

/// Variable that receives the rendered activity catalog for `build-program`.
pub const ACTIVITY_CATALOG: &str = "activity_catalog";

const CATALOG_INSTRUCTION: &str = "Only recommend activities from the catalog below. \
Each line is `title | url | time | type`. When you link to an activity, copy its URL \
exactly as listed. Never construct, shorten or guess a URL of your own.";

const EMPTY_CATALOG: &str = "(The activity catalog is currently unavailable.)";

/// A generation feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    AdaptActivity,
    BuildProgram,
    DebriefQuestions,
    BeforeAfter,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::AdaptActivity,
        Feature::BuildProgram,
        Feature::DebriefQuestions,
        Feature::BeforeAfter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AdaptActivity => "adapt-activity",
            Self::BuildProgram => "build-program",
            Self::DebriefQuestions => "debrief-questions",
            Self::BeforeAfter => "before-after",
        }
    }

    pub fn system_fragment(self) -> String {
        format!("{}-system", self.as_str())
    }

    pub fn user_fragment(self) -> String {
        format!("{}-user", self.as_str())
    }

    /// Placeholder names the feature's user template may use.
    pub fn placeholders(self) -> &'static [&'static str] {
        match self {
            Self::AdaptActivity => &["activity_content", "adaptations_list"],
            Self::BuildProgram => &[
                "group_size",
                "available_time",
                "program_outcome",
                "group_type",
                "level_of_exertion",
                "group_stage",
                "lazy_preference",
                ACTIVITY_CATALOG,
            ],
            Self::DebriefQuestions => &["activity_content", "debrief_focus", "group_details"],
            Self::BeforeAfter => &[
                "activity_content",
                "sequence_type",
                "group_details",
                "context",
                "constraints",
                "program_outcome",
            ],
        }
    }

    /// Client-facing message when generation for this feature fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::AdaptActivity => "Failed to adapt activity",
            Self::BuildProgram => "Failed to build program",
            Self::DebriefQuestions => "Failed to generate debrief questions",
            Self::BeforeAfter => "Failed to generate activity sequence",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "adapt-activity" | "adapt" => Ok(Self::AdaptActivity),
            "build-program" | "program" => Ok(Self::BuildProgram),
            "debrief-questions" | "debrief" => Ok(Self::DebriefQuestions),
            "before-after" | "sequence" => Ok(Self::BeforeAfter),
            other => Err(format!(
                "unknown feature '{other}' (expected one of: adapt-activity, build-program, debrief-questions, before-after)"
            )),
        }
    }
}

/// Which side of an activity a generated sequence covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceType {
    Before,
    After,
    Both,
}

impl SequenceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SequenceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "before" => Ok(Self::Before),
            "after" => Ok(Self::After),
            "both" => Ok(Self::Both),
            _ => Err(r#"Sequence type must be "before", "after", or "both""#.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdaptRequest {
    pub activity_content: String,
    pub adaptations: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProgramRequest {
    pub group_size: String,
    pub available_time: String,
    pub program_outcome: String,
    pub group_type: String,
    pub level_of_exertion: String,
    pub group_stage: Option<String>,
    pub lazy_preference: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DebriefRequest {
    pub activity_content: String,
    pub debrief_focus: String,
    pub group_details: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SequenceRequest {
    pub activity_content: String,
    pub sequence_type: SequenceType,
    pub group_details: Option<String>,
    pub context: Option<String>,
    pub constraints: Option<String>,
    pub program_outcome: Option<String>,
}

/// A validated request for one of the generation features.
#[derive(Debug, Clone)]
pub enum FeatureRequest {
    Adapt(AdaptRequest),
    Program(ProgramRequest),
    Debrief(DebriefRequest),
    Sequence(SequenceRequest),
}

impl FeatureRequest {
    pub fn feature(&self) -> Feature {
        match self {
            Self::Adapt(_) => Feature::AdaptActivity,
            Self::Program(_) => Feature::BuildProgram,
            Self::Debrief(_) => Feature::DebriefQuestions,
            Self::Sequence(_) => Feature::BeforeAfter,
        }
    }

    /// Template variables carried by the request.
    pub fn variables(&self) -> Variables {
        let mut vars = Variables::new();
        match self {
            Self::Adapt(req) => {
                vars.set("activity_content", req.activity_content.as_str());
                vars.set("adaptations_list", adaptations_list(&req.adaptations));
            }
            Self::Program(req) => {
                vars.set("group_size", req.group_size.as_str());
                vars.set("available_time", req.available_time.as_str());
                vars.set("program_outcome", req.program_outcome.as_str());
                vars.set("group_type", req.group_type.as_str());
                vars.set("level_of_exertion", req.level_of_exertion.as_str());
                vars.set_opt("group_stage", req.group_stage.clone());
                vars.set_opt("lazy_preference", req.lazy_preference.clone());
            }
            Self::Debrief(req) => {
                vars.set("activity_content", req.activity_content.as_str());
                vars.set("debrief_focus", req.debrief_focus.as_str());
                vars.set_opt("group_details", req.group_details.clone());
            }
            Self::Sequence(req) => {
                vars.set("activity_content", req.activity_content.as_str());
                vars.set("sequence_type", req.sequence_type.as_str());
                vars.set_opt("group_details", req.group_details.clone());
                vars.set_opt("context", req.context.clone());
                vars.set_opt("constraints", req.constraints.clone());
                vars.set_opt("program_outcome", req.program_outcome.clone());
            }
        }
        vars
    }
}

/// One `- item` line per adaptation.
fn adaptations_list(adaptations: &[String]) -> String {
    adaptations
        .iter()
        .map(|a| format!("- {a}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A ready-to-send prompt pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssembledPrompt {
    pub system_prompt: String,
    pub user_prompt: String,
}

impl AssembledPrompt {
    /// Wrap the prompt pair into a completion request for `model`.
    pub fn into_request(self, model: impl Into<String>) -> ProviderRequest {
        ProviderRequest::new(model, self.system_prompt, self.user_prompt)
    }
}

/// Builds prompts from the template store and, for `build-program`, the
/// activity catalog.
pub struct PromptAssembler {
    store: Arc<TemplateStore>,
    catalog: Arc<ActivityCatalog>,
    categories: CategoryMap,
    site_url: String,
}

impl PromptAssembler {
    pub fn new(store: Arc<TemplateStore>, catalog: Arc<ActivityCatalog>, site_url: impl Into<String>) -> Self {
        Self {
            store,
            catalog,
            categories: CategoryMap::default(),
            site_url: site_url.into(),
        }
    }

    pub fn with_categories(mut self, categories: CategoryMap) -> Self {
        self.categories = categories;
        self
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    /// Build the prompt pair for a typed request.
    pub async fn build(&self, request: &FeatureRequest) -> Result<AssembledPrompt, PromptError> {
        self.build_prompt(request.feature(), request.variables()).await
    }

    /// Build the prompt pair for `feature` with caller-supplied variables.
    ///
    /// The feature's placeholder names are always recognized, so any the
    /// caller leaves out render as the empty string.
    pub async fn build_prompt(&self, feature: Feature, variables: Variables) -> Result<AssembledPrompt, PromptError> {
        let system_name = feature.system_fragment();
        let user_name = feature.user_fragment();

        let (shared, system, user) = tokio::try_join!(
            self.store.get_fragment(SHARED_CONTEXT),
            self.store.get_fragment(&system_name),
            self.store.get_fragment(&user_name),
        )?;

        let system_prompt = format!("{shared}{SYSTEM_SEPARATOR}{system}");

        let mut vars = Variables::declared(feature.placeholders());
        if feature == Feature::BuildProgram && !variables.is_set(ACTIVITY_CATALOG) {
            vars.set(ACTIVITY_CATALOG, self.catalog_block().await);
        }
        vars.extend(variables);

        let user_prompt = template::format(&user, &vars);

        debug!(
            feature = %feature,
            shared_len = shared.len(),
            system_fragment_len = system.len(),
            system_prompt_len = system_prompt.len(),
            user_prompt_len = user_prompt.len(),
            "Assembled prompt"
        );

        Ok(AssembledPrompt {
            system_prompt,
            user_prompt,
        })
    }

    /// The activity catalog as shown to the model: an instruction paragraph
    /// followed by one `- title | url | time | type` line per activity.
    pub async fn catalog_block(&self) -> String {
        let corpus = self.catalog.load().await;
        if corpus.is_empty() {
            return EMPTY_CATALOG.to_string();
        }

        let mut block = String::from(CATALOG_INSTRUCTION);
        block.push_str("\n\n");
        for activity in corpus.activities() {
            let meta = metadata::extract(activity, &self.categories, &self.site_url);
            block.push_str(&format!(
                "- {} | {} | {} | {}\n",
                meta.title, meta.url, meta.time, meta.activity_type
            ));
        }
        block.truncate(block.trim_end().len());
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FragmentSource;
    use async_trait::async_trait;
    use huddle_config::PromptMode;
    use huddle_core::activity::ActivityRecord;
    use std::collections::HashMap;

    struct MapSource(HashMap<String, String>);

    #[async_trait]
    impl FragmentSource for MapSource {
        async fn read(&self, name: &str) -> Result<String, PromptError> {
            self.0.get(name).cloned().ok_or_else(|| PromptError::NotFound {
                name: name.to_string(),
                reason: "missing".into(),
            })
        }

        fn describe(&self) -> String {
            "map".into()
        }
    }

    fn store(fragments: &[(&str, &str)]) -> Arc<TemplateStore> {
        let map = fragments
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Arc::new(TemplateStore::new(Arc::new(MapSource(map)), PromptMode::Production))
    }

    fn full_store() -> Arc<TemplateStore> {
        store(&[
            ("shared-context", "SHARED"),
            ("adapt-activity-system", "ADAPT SYS"),
            ("adapt-activity-user", "Activity:\n{{activity_content}}\nChanges:\n{{adaptations_list}}"),
            ("build-program-system", "PROGRAM SYS"),
            (
                "build-program-user",
                "{{group_size}} people, {{available_time}}, stage [{{group_stage}}]\n{{activity_catalog}}",
            ),
            ("debrief-questions-system", "DEBRIEF SYS"),
            ("debrief-questions-user", "{{debrief_focus}} / {{group_details}} / {{unknown}}"),
            ("before-after-system", "SEQ SYS"),
            ("before-after-user", "{{sequence_type}}: {{activity_content}}"),
        ])
    }

    fn catalog() -> Arc<ActivityCatalog> {
        Arc::new(ActivityCatalog::from_records(vec![
            ActivityRecord::new("1", "Tag", "tag", "", "- **time:** 10 min\n- **type:** Fun Games"),
            ActivityRecord::new("2", "Reflect", "reflect", "", "- **type:** Mystery"),
        ]))
    }

    fn assembler() -> PromptAssembler {
        PromptAssembler::new(full_store(), catalog(), "https://x.test")
    }

    #[tokio::test]
    async fn system_prompt_joins_shared_context() {
        let prompt = assembler()
            .build_prompt(Feature::AdaptActivity, Variables::new())
            .await
            .unwrap();
        assert_eq!(prompt.system_prompt, "SHARED\n\n---\n\nADAPT SYS");
    }

    #[tokio::test]
    async fn adaptations_render_as_list() {
        let request = FeatureRequest::Adapt(AdaptRequest {
            activity_content: "Run around".into(),
            adaptations: vec!["Make it quieter".into(), "Use chairs".into()],
        });
        let prompt = assembler().build(&request).await.unwrap();
        assert_eq!(
            prompt.user_prompt,
            "Activity:\nRun around\nChanges:\n- Make it quieter\n- Use chairs"
        );
    }

    #[tokio::test]
    async fn build_program_includes_catalog() {
        let request = FeatureRequest::Program(ProgramRequest {
            group_size: "12".into(),
            available_time: "1 hour".into(),
            program_outcome: "trust".into(),
            group_type: "students".into(),
            level_of_exertion: "low".into(),
            group_stage: None,
            lazy_preference: None,
        });
        let prompt = assembler().build(&request).await.unwrap();
        let user = &prompt.user_prompt;

        assert!(user.starts_with("12 people, 1 hour, stage []\n"));
        assert!(user.contains(CATALOG_INSTRUCTION));
        assert!(user.contains("- Tag | https://x.test/fun-games/tag/ | 10 min | Fun Games"));
        assert!(user.contains("- Reflect | https://x.test/activities/reflect/ | 10-15 min | Mystery"));
        assert_eq!(user.lines().filter(|l| l.starts_with("- ")).count(), 2);
    }

    #[tokio::test]
    async fn caller_catalog_wins() {
        let vars = Variables::new().with(ACTIVITY_CATALOG, "CUSTOM");
        let prompt = assembler().build_prompt(Feature::BuildProgram, vars).await.unwrap();
        assert!(prompt.user_prompt.ends_with("CUSTOM"));
    }

    #[tokio::test]
    async fn empty_catalog_has_placeholder_text() {
        let asm = PromptAssembler::new(full_store(), Arc::new(ActivityCatalog::from_records(vec![])), "https://x.test");
        assert_eq!(asm.catalog_block().await, EMPTY_CATALOG);
    }

    #[tokio::test]
    async fn optional_fields_are_blank_and_unknowns_verbatim() {
        let request = FeatureRequest::Debrief(DebriefRequest {
            activity_content: "Tag".into(),
            debrief_focus: "teamwork".into(),
            group_details: None,
        });
        let prompt = assembler().build(&request).await.unwrap();
        assert_eq!(prompt.user_prompt, "teamwork /  / {{unknown}}");
    }

    #[tokio::test]
    async fn sequence_type_is_canonical() {
        let request = FeatureRequest::Sequence(SequenceRequest {
            activity_content: "Tag".into(),
            sequence_type: "BOTH".parse().unwrap(),
            group_details: None,
            context: None,
            constraints: None,
            program_outcome: None,
        });
        let prompt = assembler().build(&request).await.unwrap();
        assert_eq!(prompt.user_prompt, "both: Tag");
    }

    #[tokio::test]
    async fn missing_fragment_propagates() {
        let asm = PromptAssembler::new(store(&[("shared-context", "S")]), catalog(), "https://x.test");
        let err = asm
            .build_prompt(Feature::DebriefQuestions, Variables::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PromptError::NotFound { .. }));
    }

    #[tokio::test]
    async fn into_request_carries_both_messages() {
        let prompt = assembler()
            .build_prompt(Feature::BeforeAfter, Variables::new())
            .await
            .unwrap();
        let request = prompt.into_request("gpt-4o");
        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].content, "SHARED\n\n---\n\nSEQ SYS");
    }

    #[test]
    fn feature_names_and_aliases() {
        for feature in Feature::ALL {
            assert_eq!(feature.as_str().parse::<Feature>().unwrap(), feature);
        }
        assert_eq!("debrief".parse::<Feature>().unwrap(), Feature::DebriefQuestions);
        assert_eq!(Feature::BuildProgram.user_fragment(), "build-program-user");
        assert!("nope".parse::<Feature>().is_err());
        assert_eq!(
            serde_json::to_string(&Feature::BeforeAfter).unwrap(),
            "\"before-after\""
        );
    }

    #[test]
    fn sequence_type_parsing() {
        assert_eq!("Before".parse::<SequenceType>().unwrap(), SequenceType::Before);
        assert_eq!(" after ".parse::<SequenceType>().unwrap(), SequenceType::After);
        assert!("during".parse::<SequenceType>().is_err());
    }

    #[test]
    fn every_feature_declares_its_placeholders() {
        assert!(Feature::BuildProgram.placeholders().contains(&ACTIVITY_CATALOG));
        assert_eq!(Feature::BeforeAfter.placeholders().len(), 6);
    }
}

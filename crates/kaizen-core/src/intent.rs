use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Language detection
// ---------------------------------------------------------------------------

pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "ko", "ja", "zh", "es", "fr", "de", "it"];

const EUROPEAN_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "es",
        &["hola", "crear", "página", "sitio", "aplicación", "usuario", "diseño", "planificar"],
    ),
    (
        "fr",
        &["bonjour", "créer", "site", "application", "utilisateur", "conception", "planifier"],
    ),
    (
        "de",
        &["hallo", "erstellen", "webseite", "anwendung", "benutzer", "entwurf", "planung"],
    ),
    (
        "it",
        &["ciao", "creare", "pagina", "sito", "applicazione", "utente", "pianificare"],
    ),
];

/// Detect the dominant language of a prompt. CJK scripts are recognized by
/// Unicode range; European languages by keyword scoring with a two-hit
/// minimum; everything else is English.
pub fn detect_language(text: &str) -> &'static str {
    let korean = text.chars().filter(|c| ('\u{AC00}'..='\u{D7AF}').contains(c)).count();
    let kana = text.chars().filter(|c| ('\u{3040}'..='\u{30FF}').contains(c)).count();
    let cjk = text.chars().filter(|c| ('\u{4E00}'..='\u{9FFF}').contains(c)).count();

    if korean > 0 && korean >= kana && korean >= cjk {
        return "ko";
    }
    if kana > 0 {
        return "ja";
    }
    if cjk > 0 {
        return "zh";
    }

    let lower = text.to_lowercase();
    let mut best = ("en", 0usize);
    for (lang, keywords) in EUROPEAN_KEYWORDS {
        let score = keywords.iter().filter(|k| lower.contains(*k)).count();
        if score > best.1 {
            best = (lang, score);
        }
    }
    // Two keyword hits minimum, to avoid false positives on loanwords
    if best.1 >= 2 {
        best.0
    } else {
        "en"
    }
}

// ---------------------------------------------------------------------------
// Trigger matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct TriggerMatch {
    pub name: String,
    pub confidence: f64,
    pub language: String,
}

type TriggerTable = &'static [(&'static str, &'static [(&'static str, &'static [&'static str])])];

const SKILL_TRIGGERS: TriggerTable = &[
    (
        "starter",
        &[
            (
                "en",
                &["static site", "static website", "portfolio", "landing page", "html css", "beginner"],
            ),
            ("ko", &["정적 웹", "포트폴리오", "랜딩 페이지", "초보자"]),
            ("ja", &["静的サイト", "ポートフォリオ", "初心者"]),
            ("zh", &["静态网站", "作品集", "初学者"]),
            ("es", &["sitio web estático", "portafolio", "principiante"]),
            ("fr", &["site statique", "page de destination", "débutant"]),
            ("de", &["statische website", "landingpage", "anfänger"]),
            ("it", &["sito web statico", "principiante"]),
        ],
    ),
    (
        "dynamic",
        &[
            (
                "en",
                &["login", "signup", "sign up", "authentication", "fullstack", "full stack", "database", "backend", "api"],
            ),
            ("ko", &["로그인", "회원가입", "인증", "풀스택", "데이터베이스", "백엔드"]),
            ("ja", &["ログイン", "認証", "フルスタック", "データベース"]),
            ("zh", &["登录", "注册", "身份验证", "全栈", "数据库"]),
            ("es", &["iniciar sesión", "autenticación", "base de datos"]),
            ("fr", &["connexion", "authentification", "base de données"]),
            ("de", &["anmeldung", "authentifizierung", "datenbank"]),
            ("it", &["accesso", "autenticazione", "database"]),
        ],
    ),
    (
        "enterprise",
        &[
            (
                "en",
                &["microservices", "kubernetes", "k8s", "terraform", "docker", "monorepo", "infrastructure"],
            ),
            ("ko", &["마이크로서비스", "쿠버네티스", "인프라"]),
            ("ja", &["マイクロサービス", "インフラ"]),
            ("zh", &["微服务", "基础设施", "云原生"]),
            ("es", &["microservicios", "infraestructura"]),
            ("fr", &["microservices", "infrastructure"]),
            ("de", &["microservices", "infrastruktur"]),
            ("it", &["microservizi", "infrastruttura"]),
        ],
    ),
    (
        "mobile-app",
        &[
            (
                "en",
                &["mobile app", "react native", "flutter", "expo", "ios", "android"],
            ),
            ("ko", &["모바일 앱", "모바일 개발"]),
            ("ja", &["モバイルアプリ", "モバイル開発"]),
            ("zh", &["移动应用", "手机应用"]),
            ("es", &["aplicación móvil"]),
            ("fr", &["application mobile"]),
            ("de", &["mobile app"]),
            ("it", &["applicazione mobile"]),
        ],
    ),
];

const AGENT_TRIGGERS: TriggerTable = &[
    (
        "gap-detector",
        &[
            ("en", &["verify", "check compliance", "gap analysis", "compare design", "match rate"]),
            ("ko", &["검증", "갭 분석", "일치율"]),
            ("ja", &["検証", "ギャップ分析"]),
            ("zh", &["验证", "差距分析"]),
        ],
    ),
    (
        "pdca-iterator",
        &[
            ("en", &["improve", "iterate", "fix gaps", "auto-fix", "refine"]),
            ("ko", &["개선", "반복", "자동 수정"]),
            ("ja", &["改善", "反復"]),
            ("zh", &["改进", "迭代"]),
        ],
    ),
    (
        "code-analyzer",
        &[
            ("en", &["analyze", "review", "code review", "code quality"]),
            ("ko", &["분석", "코드 리뷰"]),
            ("ja", &["コードレビュー", "コード分析"]),
            ("zh", &["代码审查", "代码分析"]),
        ],
    ),
    (
        "report-generator",
        &[
            ("en", &["report", "generate report", "completion report", "summary"]),
            ("ko", &["보고서", "완료 보고", "요약"]),
            ("ja", &["レポート", "報告書"]),
            ("zh", &["报告", "摘要"]),
        ],
    ),
];

fn match_triggers(text: &str, table: TriggerTable) -> Vec<TriggerMatch> {
    let lower = text.to_lowercase();
    let mut matches: Vec<TriggerMatch> = Vec::new();

    for (name, languages) in table {
        for (lang, patterns) in *languages {
            for pattern in *patterns {
                if lower.contains(&pattern.to_lowercase()) {
                    match matches.iter_mut().find(|m| m.name == *name) {
                        Some(existing) => {
                            existing.confidence = (existing.confidence + 0.1).min(1.0);
                        }
                        None => matches.push(TriggerMatch {
                            name: (*name).to_string(),
                            confidence: 0.7,
                            language: (*lang).to_string(),
                        }),
                    }
                }
            }
        }
    }

    matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    matches
}

pub fn match_skill_triggers(text: &str) -> Vec<TriggerMatch> {
    match_triggers(text, SKILL_TRIGGERS)
}

pub fn match_agent_triggers(text: &str) -> Vec<TriggerMatch> {
    match_triggers(text, AGENT_TRIGGERS)
}

/// Implicit skill hints from file extensions mentioned in the prompt.
pub fn implicit_triggers(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    let mut triggers = Vec::new();

    if lower.contains(".tsx") || lower.contains(".jsx") || lower.contains("react") {
        triggers.push("dynamic");
    }
    if lower.contains(".html") || lower.contains(".css") {
        triggers.push("starter");
    }
    if lower.contains("dockerfile") || lower.contains(".yml") || lower.contains(".yaml") {
        triggers.push("enterprise");
    }
    if lower.contains(".swift") || lower.contains(".kt") || lower.contains(".dart") {
        triggers.push("mobile-app");
    }

    triggers.dedup();
    triggers
}

// ---------------------------------------------------------------------------
// Ambiguity scoring
// ---------------------------------------------------------------------------

pub const MAGIC_WORDS: &[&str] = &["!hotfix", "!prototype", "!bypass"];

const TECHNICAL_TERMS: &[&str] = &[
    "function", "class", "component", "module", "api", "endpoint", "database", "table", "schema",
    "migration", "deploy", "build", "test", "import", "export", "interface", "type", "const",
    "async", "await", "promise", "callback", "middleware", "route", "controller", "service",
    "repository", "model", "view", "webpack", "vite", "npm", "yarn", "docker", "git",
];

static FILE_PATH_RE: OnceLock<Regex> = OnceLock::new();

fn file_path_re() -> &'static Regex {
    FILE_PATH_RE
        .get_or_init(|| Regex::new(r"(?:/[\w.\-]+)+(?:\.\w+)?|[\w.\-]+/[\w.\-]+").unwrap())
}

/// Check for a magic word that bypasses ambiguity gating.
pub fn magic_word(text: &str) -> Option<&'static str> {
    MAGIC_WORDS.iter().copied().find(|w| text.contains(w))
}

/// Ambiguity score in 0..=100. Higher means vaguer; >= 50 warrants
/// clarification. Magic words force the score to 0.
pub fn ambiguity_score(text: &str) -> u32 {
    if text.is_empty() {
        return 100;
    }
    if magic_word(text).is_some() {
        return 0;
    }

    let lower = text.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();
    let mut score: i32 = 0;

    // Very short prompts carry no specifics
    if words.len() < 3 {
        score += 20;
    }

    const SCOPE_WORDS: &[&str] = &["all", "everything", "entire", "whole", "any", "some", "maybe"];
    if SCOPE_WORDS.iter().any(|w| lower.contains(w)) {
        score += 20;
    }

    // Bare action verbs with no surrounding context
    const AMBIGUOUS_VERBS: &[&str] =
        &["make", "do", "create", "build", "fix", "change", "update", "improve"];
    let verb_hits = AMBIGUOUS_VERBS.iter().filter(|v| words.contains(*v)).count();
    if verb_hits > 0 && words.len() < 5 {
        score += 30;
    }

    const CONFLICT_PAIRS: &[(&str, &str)] = &[
        ("simple", "complex"),
        ("quick", "thorough"),
        ("small", "large"),
        ("frontend", "backend"),
    ];
    if CONFLICT_PAIRS
        .iter()
        .any(|(a, b)| lower.contains(a) && lower.contains(b))
    {
        score += 30;
    }

    if file_path_re().is_match(text) {
        score -= 30;
    }

    let tech_hits = TECHNICAL_TERMS.iter().filter(|t| lower.contains(*t)).count();
    if tech_hits >= 2 {
        score -= 20;
    } else if tech_hits == 1 {
        score -= 10;
    }

    score.clamp(0, 100) as u32
}

pub fn needs_clarification(score: u32) -> bool {
    score >= 50
}

/// Generate clarifying questions for an ambiguous prompt.
pub fn clarifying_questions(text: &str, skill_matches: &[TriggerMatch]) -> Vec<String> {
    let mut questions = Vec::new();

    if text.trim().len() < 10 {
        questions.push("Could you provide more details about what you want to build?".to_string());
    }

    if skill_matches.len() > 1 {
        let names: Vec<&str> = skill_matches.iter().map(|m| m.name.as_str()).collect();
        questions.push(format!(
            "Your request matches multiple categories ({}). Which best describes your project?",
            names.join(", ")
        ));
    }
    if skill_matches.is_empty() {
        questions.push(
            "What type of project is this? (static website, fullstack app, mobile app, enterprise system)"
                .to_string(),
        );
    }

    let lower = text.to_lowercase();
    if !["page", "feature", "component", "api"]
        .iter()
        .any(|k| lower.contains(k))
    {
        questions.push("What specific feature or component should I focus on?".to_string());
    }

    if questions.is_empty() {
        questions.push("Could you clarify the scope and expected outcome?".to_string());
    }
    questions
}

// ---------------------------------------------------------------------------
// Feature intent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentType {
    FeatureRequest,
    BugFix,
    Question,
    General,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureIntent {
    #[serde(rename = "type")]
    pub intent_type: IntentType,
    pub feature: Option<String>,
    pub confidence: f64,
}

static FEATURE_RE: OnceLock<Regex> = OnceLock::new();
static TAGGED_FEATURE_RE: OnceLock<Regex> = OnceLock::new();
static QUESTION_RE: OnceLock<Regex> = OnceLock::new();

/// Extract what the prompt is asking for: a named feature, a bug fix, a
/// question, or general chatter.
pub fn detect_feature_intent(text: &str) -> FeatureIntent {
    let feature_re = FEATURE_RE.get_or_init(|| {
        Regex::new(r"(?i)(?:create|build|implement|add|make|develop)\s+(?:a\s+)?([a-z][a-z0-9\-]*(?:\s+[a-z0-9\-]+){0,2})")
            .unwrap()
    });
    let tagged_re =
        TAGGED_FEATURE_RE.get_or_init(|| Regex::new(r"(?i)feature[:\s]+([a-z][a-z0-9\-]+)").unwrap());

    for re in [feature_re, tagged_re] {
        if let Some(caps) = re.captures(text) {
            let feature = caps[1].trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("-");
            return FeatureIntent {
                intent_type: IntentType::FeatureRequest,
                feature: Some(feature),
                confidence: 0.8,
            };
        }
    }

    let lower = text.to_lowercase();
    if ["fix ", "bug ", "error ", "버그", "수정", "バグ", "修复"]
        .iter()
        .any(|p| lower.contains(p))
    {
        return FeatureIntent {
            intent_type: IntentType::BugFix,
            feature: None,
            confidence: 0.6,
        };
    }

    let question_re = QUESTION_RE
        .get_or_init(|| Regex::new(r"how\s+(to|do|can)|what\s+(is|are)|why\s+|어떻게|무엇").unwrap());
    if question_re.is_match(&lower) {
        return FeatureIntent {
            intent_type: IntentType::Question,
            feature: None,
            confidence: 0.7,
        };
    }

    FeatureIntent {
        intent_type: IntentType::General,
        feature: None,
        confidence: 0.5,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_cjk_languages() {
        assert_eq!(detect_language("로그인 기능 만들어줘"), "ko");
        assert_eq!(detect_language("ログイン機能を作って"), "ja");
        assert_eq!(detect_language("创建登录功能"), "zh");
    }

    #[test]
    fn detects_european_languages_with_two_hits() {
        assert_eq!(detect_language("hola, quiero crear una página"), "es");
        // A single loanword is not enough
        assert_eq!(detect_language("open the portfolio"), "en");
    }

    #[test]
    fn defaults_to_english() {
        assert_eq!(detect_language("build a login page"), "en");
        assert_eq!(detect_language(""), "en");
    }

    #[test]
    fn detection_stays_within_supported_languages() {
        for text in ["hola crear página", "로그인", "ログイン", "登录", "plain english"] {
            assert!(SUPPORTED_LANGUAGES.contains(&detect_language(text)));
        }
    }

    #[test]
    fn skill_triggers_accumulate_confidence() {
        let matches = match_skill_triggers("fullstack app with login and database");
        assert_eq!(matches[0].name, "dynamic");
        assert!(matches[0].confidence > 0.7);
    }

    #[test]
    fn agent_triggers_match() {
        let matches = match_agent_triggers("run a gap analysis against the design");
        assert!(matches.iter().any(|m| m.name == "gap-detector"));
    }

    #[test]
    fn implicit_triggers_from_extensions() {
        assert_eq!(implicit_triggers("edit src/App.tsx"), vec!["dynamic"]);
        assert_eq!(implicit_triggers("style.css tweaks"), vec!["starter"]);
        assert!(implicit_triggers("plain words").is_empty());
    }

    #[test]
    fn magic_word_zeroes_score() {
        assert_eq!(ambiguity_score("!hotfix make it"), 0);
        assert_eq!(magic_word("!prototype dashboard"), Some("!prototype"));
    }

    #[test]
    fn vague_prompts_score_high() {
        assert!(needs_clarification(ambiguity_score("fix everything")));
        assert!(ambiguity_score("improve it") >= 50);
    }

    #[test]
    fn specific_prompts_score_low() {
        let score = ambiguity_score("add a database migration endpoint in src/api/users.rs");
        assert!(score < 50, "score was {score}");
    }

    #[test]
    fn clarifying_questions_never_empty() {
        assert!(!clarifying_questions("x", &[]).is_empty());
        assert!(!clarifying_questions("build the api feature page now please", &[]).is_empty());
    }

    #[test]
    fn feature_intent_extraction() {
        let intent = detect_feature_intent("implement user-auth");
        assert_eq!(intent.intent_type, IntentType::FeatureRequest);
        assert_eq!(intent.feature.as_deref(), Some("user-auth"));

        let intent = detect_feature_intent("please create a landing page");
        assert_eq!(intent.intent_type, IntentType::FeatureRequest);
        assert_eq!(intent.feature.as_deref(), Some("landing-page"));
    }

    #[test]
    fn bug_and_question_intents() {
        assert_eq!(
            detect_feature_intent("why is the page blank").intent_type,
            IntentType::Question
        );
        assert_eq!(detect_feature_intent("ok thanks").intent_type, IntentType::General);
    }
}

//! Definition Cue Classifier
//!
//! Cheap keyword heuristics over a service definition. Three independent
//! pattern families look for who the service is for, what users do with it,
//! and what they get out of it. Korean cues are plain substrings (Korean has
//! no word boundaries to anchor on); English cues are case-insensitive word
//! prefixes so "users" and "selling" count while "notebook" is not "book".

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Signals needed for a definition to stand on its own
pub const REQUIRED_SIGNALS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Who the service is for
    Target,
    /// What users do with it
    Action,
    /// Why it matters / what they get
    Value,
}

impl Signal {
    pub const ALL: [Signal; 3] = [Signal::Target, Signal::Action, Signal::Value];

    /// Label used when asking for the missing aspect
    pub fn label(&self) -> &'static str {
        match self {
            Self::Target => "누가",
            Self::Action => "무엇을",
            Self::Value => "왜/어떤 결과",
        }
    }

    fn patterns(&self) -> &'static [Regex] {
        match self {
            Self::Target => target_patterns(),
            Self::Action => action_patterns(),
            Self::Value => value_patterns(),
        }
    }
}

/// Which signals a text carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SignalReport {
    pub target: bool,
    pub action: bool,
    pub value: bool,
}

impl SignalReport {
    pub fn has(&self, signal: Signal) -> bool {
        match signal {
            Signal::Target => self.target,
            Signal::Action => self.action,
            Signal::Value => self.value,
        }
    }

    pub fn count(&self) -> usize {
        Signal::ALL.iter().filter(|s| self.has(**s)).count()
    }

    pub fn is_sufficient(&self) -> bool {
        self.count() >= REQUIRED_SIGNALS
    }

    pub fn missing(&self) -> Vec<Signal> {
        Signal::ALL.into_iter().filter(|s| !self.has(*s)).collect()
    }
}

/// Classify a service definition
pub fn classify(text: &str) -> SignalReport {
    let hit = |signal: Signal| signal.patterns().iter().any(|re| re.is_match(text));
    SignalReport {
        target: hit(Signal::Target),
        action: hit(Signal::Action),
        value: hit(Signal::Value),
    }
}

/// True when a value proposition leans on price
pub fn mentions_price(text: &str) -> bool {
    price_patterns().iter().any(|re| re.is_match(text))
}

fn compile(korean: &[&str], english: &[&str]) -> Vec<Regex> {
    let korean = korean.iter().map(|cue| regex::escape(cue));
    let english = english.iter().map(|cue| format!(r"(?i)\b{}", regex::escape(cue)));
    korean
        .chain(english)
        .filter_map(|pattern| Regex::new(&pattern).ok())
        .collect()
}

fn target_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        compile(
            &[
                "프리랜서", "농부", "판매자", "구매자", "사용자", "고객", "학생", "강사", "누가",
                "사람", "기업", "개인",
            ],
            &[
                "freelancer", "user", "customer", "client", "seller", "buyer", "student",
                "teacher", "people", "business", "compan", "individual",
            ],
        )
    })
}

fn action_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let mut patterns = compile(
            &[
                "올리", "판매", "팔고", "팔아", "팔기", "구매", "구입", "매칭", "거래", "검색",
                "등록", "예약", "주문", "배달", "연결", "공유", "무엇을", "하는",
            ],
            &[
                "upload", "sell", "buy", "match", "trade", "search", "register", "book",
                "order", "deliver", "connect", "share", "create", "post", "receive",
            ],
        );
        // 팔다/사다 conjugations; a bare 사 would also hit 사람
        patterns.extend(Regex::new(r"(?:파|사)(?:는|고|서|려)|팔\s|살\s*수").ok());
        patterns
    })
}

fn value_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        compile(
            &[
                "받", "얻", "신선", "편리", "빠른", "저렴", "쉽", "효율", "절약", "왜", "위해",
                "결과",
            ],
            &[
                "get", "earn", "fresh", "convenien", "fast", "cheap", "easy", "efficien",
                "save", "work", "income", "benefit", "result",
            ],
        )
    })
}

fn price_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let mut patterns = compile(&["싸서", "무료", "저렴", "가격", "비용"], &[]);
        // whole words only, so "freelancer" is not "free"
        patterns.extend(Regex::new(r"(?i)\b(?:cheap\w*|free|prices?|pricing|costs?)\b").ok());
        patterns
    })
}

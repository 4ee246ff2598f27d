//! RFP Section Taxonomy
//!
//! The fixed set of leaf sections an RFP document is made of, in document
//! order, plus the heading groups used when rendering.

use serde::Serialize;

/// A leaf section of the RFP document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionInfo {
    pub id: &'static str,
    pub name: &'static str,
}

const fn section(id: &'static str, name: &'static str) -> SectionInfo {
    SectionInfo { id, name }
}

/// Every leaf section, in document order
pub const SECTIONS: [SectionInfo; 21] = [
    section("1.1.1", "해결하려는 문제"),
    section("1.1.2", "기존 해결책과 한계"),
    section("1.1.3", "경쟁/대체재 분석"),
    section("1.1.4", "유입 채널"),
    section("1.2.1", "사용자 유형"),
    section("1.2.2", "사용자별 핵심 목표"),
    section("1.3.1", "핵심 기능 (Must)"),
    section("1.3.2", "부가 기능 (Nice to have)"),
    section("1.3.3", "제외 기능 (Out of scope)"),
    section("1.4.1", "수익 모델"),
    section("1.4.2", "운영 비용"),
    section("1.5.1", "플랫폼 결정"),
    section("1.5.2", "외부 의존성"),
    section("1.5.3", "규제 제약"),
    section("1.5.4", "데이터 제약"),
    section("1.6.1", "핵심 지표"),
    section("1.6.2", "MVP 검증 가설"),
    section("1.7", "용어 정의"),
    section("1.8", "핵심 시나리오 개요"),
    section("1.9", "결정 보류 항목"),
    section("1.10", "브랜딩"),
];

/// A rendering heading and the leaf sections under it
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SectionGroup {
    pub id: &'static str,
    pub name: &'static str,
    pub section_ids: &'static [&'static str],
}

pub const SECTION_GROUPS: [SectionGroup; 10] = [
    SectionGroup {
        id: "1.1",
        name: "문제 정의",
        section_ids: &["1.1.1", "1.1.2", "1.1.3", "1.1.4"],
    },
    SectionGroup {
        id: "1.2",
        name: "사용자 정의",
        section_ids: &["1.2.1", "1.2.2"],
    },
    SectionGroup {
        id: "1.3",
        name: "기능 범위",
        section_ids: &["1.3.1", "1.3.2", "1.3.3"],
    },
    SectionGroup {
        id: "1.4",
        name: "수익/비용 구조",
        section_ids: &["1.4.1", "1.4.2"],
    },
    SectionGroup {
        id: "1.5",
        name: "기술 제약",
        section_ids: &["1.5.1", "1.5.2", "1.5.3", "1.5.4"],
    },
    SectionGroup {
        id: "1.6",
        name: "성공 정의",
        section_ids: &["1.6.1", "1.6.2"],
    },
    SectionGroup {
        id: "1.7",
        name: "용어 정의",
        section_ids: &["1.7"],
    },
    SectionGroup {
        id: "1.8",
        name: "핵심 시나리오 개요",
        section_ids: &["1.8"],
    },
    SectionGroup {
        id: "1.9",
        name: "결정 보류 항목",
        section_ids: &["1.9"],
    },
    SectionGroup {
        id: "1.10",
        name: "브랜딩",
        section_ids: &["1.10"],
    },
];

/// Sections that must be filled before an RFP is considered usable
pub const MINIMUM_REQUIRED_SECTIONS: [&str; 3] = ["1.1.1", "1.2.1", "1.3.1"];

/// Missing sections are raised in this order first
pub const P0_PRIORITY_ORDER: [&str; 5] = ["1.3.1", "1.4.1", "1.5.2", "1.5.1", "1.2.1"];

/// Look up a section's display name
pub fn section_name(id: &str) -> Option<&'static str> {
    SECTIONS.iter().find(|s| s.id == id).map(|s| s.name)
}

pub fn is_known_section(id: &str) -> bool {
    SECTIONS.iter().any(|s| s.id == id)
}

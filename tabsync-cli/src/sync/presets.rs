//! Built-in layouts for the test-result spreadsheet and the rules table

use super::{Cell, Column, ColumnRule, RowLayout};

/// Judgement formula comparing the expected answer (C) with the AI answer (D)
pub const JUDGEMENT_FORMULA: &str = r#"=IF(C{row}=D{row},"○","×")"#;

/// Key field that addresses a question's spreadsheet row
pub const QUESTION_KEY: &str = "question_number";

/// Question `n` sits on sheet row `first_row + n - 1`
fn judgement(first_row: usize) -> ColumnRule {
    ColumnRule::Formula {
        template: JUDGEMENT_FORMULA.to_string(),
        row_key: QUESTION_KEY.to_string(),
        row_offset: i64::try_from(first_row).map_or(i64::MAX, |row| row - 1),
    }
}

/// Columns A..N of the result sheet, evaluation columns left blank
pub fn questions_sheet() -> RowLayout {
    RowLayout::new(
        "questions-sheet",
        vec![
            Column::new("question_number", ColumnRule::field("question_number")).at("A"),
            Column::new("question_text", ColumnRule::field("question_text")).at("B"),
            Column::new("correct_answer", ColumnRule::field("correct_answer")).at("C"),
            Column::new("ai_answer", ColumnRule::Blank).at("D"),
            Column::new("judgement", ColumnRule::Blank).at("E"),
            Column::new("confidence", ColumnRule::Blank).at("F"),
            Column::new("top_article", ColumnRule::Blank).at("G"),
            Column::new("search_score", ColumnRule::Blank).at("H"),
            Column::new("response_time_ms", ColumnRule::Blank).at("I"),
            Column::new("category", ColumnRule::field("category")).at("J"),
            Column::new("difficulty", ColumnRule::field("difficulty")).at("K"),
            Column::new("explanation", ColumnRule::field("explanation")).at("L"),
            Column::new("tested_at", ColumnRule::Blank).at("M"),
            Column::new("notes", ColumnRule::Blank).at("N"),
        ],
    )
}

/// Evaluation columns D..I plus the run timestamp in M
pub fn results_sheet(first_row: usize) -> RowLayout {
    RowLayout::new(
        "results-sheet",
        vec![
            Column::new("ai_answer", ColumnRule::field("ai_answer")).at("D"),
            Column::new("judgement", judgement(first_row)).at("E"),
            Column::new("confidence_grade", ColumnRule::field("confidence_grade")).at("F"),
            Column::new("top_article", ColumnRule::field("top_article")).at("G"),
            Column::new(
                "search_score",
                ColumnRule::Pointer {
                    pointer: "/search_results/0/combinedScore".to_string(),
                    round: Some(3),
                },
            )
            .at("H"),
            Column::new("response_time_ms", ColumnRule::field("response_time_ms")).at("I"),
            Column::new("tested_at", ColumnRule::context("timestamp")).at("M"),
        ],
    )
}

/// Evaluation columns D..K, with references and reasoning, plus the run timestamp in O
pub fn reasoning_sheet(first_row: usize) -> RowLayout {
    RowLayout::new(
        "reasoning-sheet",
        vec![
            Column::new("ai_answer", ColumnRule::field("ai_answer")).at("D"),
            Column::new("references", ColumnRule::field("references")).at("E"),
            Column::new("reasoning", ColumnRule::field("reasoning")).at("F"),
            Column::new("judgement", judgement(first_row)).at("G"),
            Column::new("confidence_grade", ColumnRule::field("confidence_grade")).at("H"),
            Column::new("top_article", ColumnRule::field("top_article")).at("I"),
            Column::new("search_score", ColumnRule::grade_score("confidence_grade")).at("J"),
            Column::new("response_time_ms", ColumnRule::field("response_time_ms")).at("K"),
            Column::new("tested_at", ColumnRule::context("timestamp")).at("O"),
        ],
    )
}

/// Columns of the rule-section table
pub fn rules_table() -> RowLayout {
    let field = |name: &str| Column::new(name, ColumnRule::field(name));

    RowLayout::new(
        "rules-table",
        vec![
            field("section_id"),
            Column::new(
                "section_name",
                ColumnRule::SplitLabel {
                    id_field: "section_id".to_string(),
                    flag_field: "is_split".to_string(),
                    index_field: "split_index".to_string(),
                    total_field: "split_total".to_string(),
                },
            ),
            field("part"),
            field("type"),
            field("chapter"),
            field("article"),
            field("section"),
            field("subsection"),
            field("content"),
            Column::new("is_split", ColumnRule::field_or("is_split", Cell::Bool(false))),
            field("split_index"),
            field("split_total"),
            field("line_start"),
            field("line_end"),
        ],
    )
}

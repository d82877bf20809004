//! Builds the explanation shown after an answer is checked.
//!
//! The base explanation of a question is extended with a code sample, a
//! comparison note and a closing tip. Which extras apply is decided by an
//! ordered rule table keyed on words in the (lowercased) prompt.

use serde::Serialize;
use std::fmt;

use crate::model::Question;

//
// ─── SEGMENTS ──────────────────────────────────────────────────────────────────
//

/// How the presentation layer should draw a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SegmentKind {
    Text,
    Code,
    Comparison,
    Tip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub content: String,
}

impl Segment {
    fn new(kind: SegmentKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl Verdict {
    #[must_use]
    pub fn from_outcome(was_correct: bool) -> Self {
        if was_correct {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Correct => "Correto!",
            Verdict::Incorrect => "Resposta incorreta.",
        }
    }
}

/// Display-ready explanation: a verdict plus ordered segments.
///
/// Segment order is always base text, code (optional), comparison (optional),
/// tip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    verdict: Verdict,
    segments: Vec<Segment>,
}

impl Explanation {
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn segment(&self, kind: SegmentKind) -> Option<&Segment> {
        self.segments.iter().find(|s| s.kind == kind)
    }

    /// Segments joined by a blank line. The verdict is not included.
    #[must_use]
    pub fn render(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

//
// ─── RULE TABLE ────────────────────────────────────────────────────────────────
//

const SEPARATOR: &str = "\n\n";

const CODE_KEYWORDS: &[&str] = &[
    "sintaxe", "código", "codigo", "operador", "ponteiro", "função", "funcao", "syntax", "code",
    "operator", "pointer",
];

/// Word stems that together name a function pointer, in any inflection or
/// word order ("ponteiros para funções", "ponteiro para uma função").
const FUNCTION_POINTER_PAIRS: &[(&str, &str)] = &[
    ("ponteiro", "funç"),
    ("ponteiro", "funcao"),
    ("ponteiro", "funcoe"),
    ("pointer", "function"),
];

const CALLBACK_KEYWORDS: &[&str] = &["callback"];

const OPERATOR_KEYWORDS: &[&str] = &["operador", "operator"];

const COMPARISON_KEYWORDS: &[&str] = &["java"];

pub const FUNCTION_POINTER_SNIPPET: &str = "\
int soma(int a, int b) { return a + b; }

int main(void) {
    int (*operacao)(int, int) = soma;
    printf(\"%d\\n\", operacao(2, 3));
    return 0;
}";

pub const OPERATOR_SNIPPET: &str = "\
int x = 10;
int *p = &x;            /* & obtém o endereço de x */
printf(\"%d\\n\", *p);   /* * acessa o valor apontado */
*p = 20;                /* altera x através do ponteiro */";

pub const COMPARISON_NOTE: &str = "Comparação com Java: em Java não há ponteiros explícitos. \
Variáveis de objeto guardam referências gerenciadas pela JVM e não existe aritmética de \
ponteiros. Em C o programador manipula endereços de memória diretamente.";

pub const DEFAULT_TIP: &str = "Dica: escreva pequenos programas para testar o conceito e \
compile com avisos ativados (gcc -Wall -Wextra).";

/// Extra content a rule contributes when its keywords match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Producer {
    /// The question's own code example, or a default snippet.
    CodeSample,
    /// The fixed cross-topic comparison note.
    ComparisonNote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultSnippet {
    FunctionPointer,
    Operator,
}

impl DefaultSnippet {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            DefaultSnippet::FunctionPointer => FUNCTION_POINTER_SNIPPET,
            DefaultSnippet::Operator => OPERATOR_SNIPPET,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Keywords {
    /// The prompt contains at least one keyword.
    Any(&'static [&'static str]),
    /// The prompt contains both stems of at least one pair.
    Pair(&'static [(&'static str, &'static str)]),
}

impl Keywords {
    fn matches(self, prompt: &str) -> bool {
        match self {
            Keywords::Any(words) => words.iter().any(|w| prompt.contains(w)),
            Keywords::Pair(pairs) => pairs
                .iter()
                .any(|(a, b)| prompt.contains(a) && prompt.contains(b)),
        }
    }
}

struct Rule<T> {
    keywords: Keywords,
    produces: T,
}

impl<T: Copy> Rule<T> {
    fn matches(&self, prompt: &str) -> bool {
        self.keywords.matches(prompt)
    }
}

/// Evaluated in order; each matching rule appends one segment.
const SEGMENT_RULES: &[Rule<Producer>] = &[
    Rule {
        keywords: Keywords::Any(CODE_KEYWORDS),
        produces: Producer::CodeSample,
    },
    Rule {
        keywords: Keywords::Any(COMPARISON_KEYWORDS),
        produces: Producer::ComparisonNote,
    },
];

/// First match wins, so the more specific function-pointer rule is listed first.
const SNIPPET_RULES: &[Rule<DefaultSnippet>] = &[
    Rule {
        keywords: Keywords::Pair(FUNCTION_POINTER_PAIRS),
        produces: DefaultSnippet::FunctionPointer,
    },
    Rule {
        keywords: Keywords::Any(CALLBACK_KEYWORDS),
        produces: DefaultSnippet::FunctionPointer,
    },
    Rule {
        keywords: Keywords::Any(OPERATOR_KEYWORDS),
        produces: DefaultSnippet::Operator,
    },
];

/// Picks the default snippet for a lowercased prompt.
///
/// Prompts that hit a code keyword but neither snippet rule get the operator
/// snippet.
#[must_use]
pub fn default_snippet(prompt_lower: &str) -> DefaultSnippet {
    SNIPPET_RULES
        .iter()
        .find(|rule| rule.matches(prompt_lower))
        .map_or(DefaultSnippet::Operator, |rule| rule.produces)
}

//
// ─── ENRICHMENT ────────────────────────────────────────────────────────────────
//

/// Builds the explanation for `question`.
///
/// Never fails; missing optional fields fall back to fixed defaults.
///
/// # Examples
///
/// ```
/// # use quiz_core::enrich::{enrich, SegmentKind, OPERATOR_SNIPPET};
/// # use quiz_core::model::QuestionDraft;
/// let question = QuestionDraft::new("Qual operador obtém o endereço?", ["*", "&"], 1, "É o &.")
///     .validate()
///     .unwrap();
/// let explanation = enrich(&question, true);
/// assert_eq!(explanation.segment(SegmentKind::Code).unwrap().content, OPERATOR_SNIPPET);
/// ```
#[must_use]
pub fn enrich(question: &Question, was_correct: bool) -> Explanation {
    let prompt = question.prompt().to_lowercase();
    let mut segments = vec![Segment::new(SegmentKind::Text, question.explanation())];

    for rule in SEGMENT_RULES.iter().filter(|rule| rule.matches(&prompt)) {
        let segment = match rule.produces {
            Producer::CodeSample => {
                let code = question
                    .code_example()
                    .unwrap_or_else(|| default_snippet(&prompt).code());
                Segment::new(SegmentKind::Code, code)
            }
            Producer::ComparisonNote => Segment::new(SegmentKind::Comparison, COMPARISON_NOTE),
        };
        segments.push(segment);
    }

    segments.push(Segment::new(
        SegmentKind::Tip,
        question.tip().unwrap_or(DEFAULT_TIP),
    ));

    Explanation {
        verdict: Verdict::from_outcome(was_correct),
        segments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionDraft;

    fn question(prompt: &str) -> QuestionDraft {
        QuestionDraft::new(prompt, ["a", "b", "c", "d"], 0, "Explicação base.")
    }

    fn kinds(explanation: &Explanation) -> Vec<SegmentKind> {
        explanation.segments().iter().map(|s| s.kind).collect()
    }

    #[test]
    fn plain_prompt_gets_base_and_default_tip() {
        let q = question("Quantos bytes tem um char?").validate().unwrap();
        let e = enrich(&q, true);
        assert_eq!(kinds(&e), [SegmentKind::Text, SegmentKind::Tip]);
        assert_eq!(e.render(), format!("Explicação base.\n\n{DEFAULT_TIP}"));
    }

    #[test]
    fn operator_prompt_gets_generic_snippet() {
        let q = question("O que faz o operador * em uma declaração?")
            .validate()
            .unwrap();
        let e = enrich(&q, false);
        assert_eq!(e.segment(SegmentKind::Code).unwrap().content, OPERATOR_SNIPPET);
        assert_eq!(e.verdict(), Verdict::Incorrect);
    }

    #[test]
    fn function_pointer_wins_over_operator() {
        let q = question("Qual operador é usado ao chamar um ponteiro para função?")
            .validate()
            .unwrap();
        let e = enrich(&q, true);
        assert_eq!(
            e.segment(SegmentKind::Code).unwrap().content,
            FUNCTION_POINTER_SNIPPET
        );
    }

    #[test]
    fn inflected_function_pointer_phrasing_gets_specific_snippet() {
        for prompt in [
            "Para que servem ponteiros para função em C?",
            "Como declarar um ponteiro para uma função?",
            "Ponteiros de função podem ser comparados?",
            "Qual o tipo de ponteiros para funcoes?",
            "How is a function pointer declared?",
        ] {
            let q = question(prompt).validate().unwrap();
            assert_eq!(
                enrich(&q, true).segment(SegmentKind::Code).unwrap().content,
                FUNCTION_POINTER_SNIPPET,
                "{prompt}"
            );
        }
    }

    #[test]
    fn pointer_prompt_without_function_keeps_operator_snippet() {
        assert_eq!(
            default_snippet("como um ponteiro funciona?"),
            DefaultSnippet::Operator
        );
        assert_eq!(
            default_snippet("qual operador retorna o endereço de uma função?"),
            DefaultSnippet::Operator
        );
    }

    #[test]
    fn own_code_example_replaces_defaults() {
        let q = question("Qual a sintaxe de um ponteiro para função?")
            .with_code_example("void (*f)(void);")
            .validate()
            .unwrap();
        let e = enrich(&q, true);
        assert_eq!(e.segment(SegmentKind::Code).unwrap().content, "void (*f)(void);");
    }

    #[test]
    fn code_example_ignored_without_code_keyword() {
        let q = question("Quem criou a linguagem C?")
            .with_code_example("int main(void) { return 0; }")
            .validate()
            .unwrap();
        assert!(enrich(&q, true).segment(SegmentKind::Code).is_none());
    }

    #[test]
    fn java_mention_adds_comparison_after_code() {
        let q = question("Diferente de JAVA, como o operador & funciona em C?")
            .with_tip("Pense em endereços.")
            .validate()
            .unwrap();
        let e = enrich(&q, true);
        assert_eq!(
            kinds(&e),
            [
                SegmentKind::Text,
                SegmentKind::Code,
                SegmentKind::Comparison,
                SegmentKind::Tip
            ]
        );
        assert_eq!(e.segments()[3].content, "Pense em endereços.");
        assert_eq!(
            e.render(),
            format!("Explicação base.\n\n{OPERATOR_SNIPPET}\n\n{COMPARISON_NOTE}\n\nPense em endereços.")
        );
    }

    #[test]
    fn passing_java_mention_still_gets_comparison() {
        let q = question("Assim como em Java, C tem tipos primitivos?")
            .validate()
            .unwrap();
        assert!(enrich(&q, true).segment(SegmentKind::Comparison).is_some());
    }

    #[test]
    fn code_keyword_without_snippet_keyword_falls_back_to_operator() {
        assert_eq!(default_snippet("qual a sintaxe correta?"), DefaultSnippet::Operator);
        assert_eq!(
            default_snippet("um callback em c"),
            DefaultSnippet::FunctionPointer
        );
    }

    #[test]
    fn enrichment_is_deterministic() {
        let q = question("Como declarar um ponteiro para função que compara com Java?")
            .validate()
            .unwrap();
        assert_eq!(enrich(&q, true).render(), enrich(&q, true).render());
        assert_eq!(enrich(&q, false).segments(), enrich(&q, true).segments());
    }
}

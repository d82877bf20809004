use std::cell::RefCell;
use std::rc::Rc;

use quiz_core::enrich::{OPERATOR_SNIPPET, SegmentKind};
use quiz_core::model::{QuestionDraft, SessionError, SessionPhase, SessionSnapshot, TopicId};
use quiz_core::time::{fixed_clock, fixed_now};
use services::{QuizError, QuizSessionController};

fn three_question_bank() -> Vec<QuestionDraft> {
    vec![
        QuestionDraft::new(
            "O que o operador & retorna?",
            ["valor", "endereço", "tamanho", "tipo"],
            1,
            "Retorna o endereço.",
        ),
        QuestionDraft::new(
            "Como se declara um ponteiro para função?",
            ["int *f();", "int (*f)();", "int f*();", "*int f();"],
            1,
            "Os parênteses importam.",
        ),
        QuestionDraft::new(
            "Qual função libera memória?",
            ["free", "delete", "drop", "dispose"],
            0,
            "free devolve a memória.",
        ),
    ]
}

fn start() -> QuizSessionController {
    QuizSessionController::from_drafts(
        TopicId::new("ponteiros").unwrap(),
        three_question_bank(),
        fixed_clock(),
    )
    .unwrap()
}

fn answer(controller: &mut QuizSessionController, option: usize) -> SessionSnapshot {
    controller.select_option(option).unwrap();
    controller.check_answer().unwrap();
    controller.next_question().unwrap()
}

#[test]
fn correct_incorrect_correct_scores_sixty_seven_percent() {
    let mut controller = start();
    answer(&mut controller, 1);
    answer(&mut controller, 0);
    let last = answer(&mut controller, 0);

    assert!(last.is_completed);
    assert_eq!(last.phase, SessionPhase::Completed);
    assert_eq!(last.score, 2);
    assert_eq!(controller.final_score_percentage().unwrap(), 67);

    let summary = controller.summary().expect("summary after completion");
    assert_eq!(summary.score(), 2);
    assert_eq!(summary.total(), 3);
    assert_eq!(summary.missed_questions(), vec![1]);
    assert_eq!(summary.started_at(), fixed_now());
}

#[test]
fn out_of_range_option_is_reported_and_ignored() {
    let mut controller = start();
    controller.select_option(3).unwrap();

    let err = controller.select_option(5).unwrap_err();
    assert_eq!(
        err,
        QuizError::Session(SessionError::IndexOutOfRange { index: 5, len: 4 })
    );
    assert_eq!(controller.snapshot().selected_option, Some(3));
}

#[test]
fn double_check_is_rejected_without_rescoring() {
    let mut controller = start();
    controller.select_option(1).unwrap();
    let first = controller.check_answer().unwrap();
    assert_eq!(first.score, 1);

    let err = controller.check_answer().unwrap_err();
    assert!(err.is_invalid_transition());
    assert_eq!(controller.snapshot().score, 1);
}

#[test]
fn completed_session_rejects_intents() {
    let mut controller = start();
    for option in [1, 1, 0] {
        answer(&mut controller, option);
    }
    assert!(controller.snapshot().is_completed);
    assert_eq!(controller.snapshot().current_index, 2);

    assert!(controller.select_option(0).unwrap_err().is_invalid_transition());
    assert!(controller.check_answer().unwrap_err().is_invalid_transition());
    assert!(controller.next_question().unwrap_err().is_invalid_transition());
    assert_eq!(controller.snapshot().score, 3);
}

#[test]
fn observers_see_every_accepted_transition() {
    let seen: Rc<RefCell<Vec<SessionSnapshot>>> = Rc::default();
    let mut controller = start();
    let sink = Rc::clone(&seen);
    controller.subscribe(move |snapshot| sink.borrow_mut().push(*snapshot));

    answer(&mut controller, 1);
    assert!(controller.next_question().is_err());
    answer(&mut controller, 2);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 6);
    assert_eq!(seen[1].phase, SessionPhase::AnswerChecked);
    assert_eq!(seen[2].phase, SessionPhase::AwaitingSelection);
    assert_eq!(seen[2].selected_option, None);
    assert!(!seen[2].is_answer_checked);

    let progress: Vec<f64> = seen.iter().map(|s| s.progress_fraction).collect();
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn progress_reaches_one_on_last_question() {
    let mut controller = start();
    answer(&mut controller, 0);
    assert!(controller.progress_fraction() < 1.0);
    answer(&mut controller, 0);
    assert!((controller.progress_fraction() - 1.0).abs() < f64::EPSILON);
    assert_eq!(controller.phase(), SessionPhase::AwaitingSelection);
}

#[test]
fn operator_question_gets_generic_snippet_after_check() {
    let mut controller = start();
    controller.select_option(1).unwrap();
    controller.check_answer().unwrap();

    let explanation = controller.explanation().unwrap();
    assert_eq!(
        explanation.segment(SegmentKind::Code).unwrap().content,
        OPERATOR_SNIPPET
    );
    assert_eq!(explanation.segments().last().unwrap().kind, SegmentKind::Tip);
}

#[test]
fn restart_resets_progress_and_notifies() {
    let notified = Rc::new(RefCell::new(Vec::new()));
    let mut controller = QuizSessionController::from_drafts(
        TopicId::new("ponteiros").unwrap(),
        three_question_bank(),
        fixed_clock(),
    )
    .unwrap();
    let sink = Rc::clone(&notified);
    controller.subscribe(move |snapshot: &SessionSnapshot| sink.borrow_mut().push(snapshot.phase));

    for option in [1, 1, 0] {
        answer(&mut controller, option);
    }
    assert!(controller.summary().is_some());

    let fresh = controller.restart();
    assert_eq!(fresh.current_index, 0);
    assert_eq!(fresh.score, 0);
    assert!(!fresh.is_completed);
    assert!(controller.summary().is_none());
    assert_eq!(
        notified.borrow().last(),
        Some(&SessionPhase::AwaitingSelection)
    );
}

#[test]
fn invalid_bank_produces_no_controller() {
    let mut bank = three_question_bank();
    bank[2].correct_index = 9;
    let err = QuizSessionController::from_drafts(
        TopicId::new("ponteiros").unwrap(),
        bank,
        fixed_clock(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        QuizError::Session(SessionError::InvalidQuestionBank(_))
    ));
    assert!(err.to_string().starts_with("could not load quiz"));
}

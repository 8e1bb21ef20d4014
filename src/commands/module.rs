use anyhow::{Result, anyhow};
use jiff::Timestamp;

use crate::db::Database;
use crate::helpers::find_similar_id;
use crate::id::generate_id;
use crate::models::{Module, QuizQuestion, QuizScore};
use crate::session::Session;

/// Result of grading a quiz submission.
#[derive(Debug)]
pub struct QuizReport {
    pub module: Module,
    pub score: QuizScore,
}

pub fn create(
    title: String,
    description: String,
    content: String,
    image: Option<String>,
    questions: &[String],
    session: &Session,
    db: &mut Database,
) -> Result<Module> {
    if !session.role.can_author_modules() {
        return Err(anyhow!("Only experts and admins can create modules."));
    }

    let quiz = questions
        .iter()
        .map(|spec| parse_question(spec))
        .collect::<Result<Vec<_>>>()?;

    let module = Module {
        id: generate_id(),
        title,
        description,
        content,
        image,
        quiz,
        created_at: Timestamp::now(),
    };

    db.create_module(module.clone())?;
    Ok(module)
}

/// Parse a quiz question spec of the form "question|option1,option2,...|answer".
/// The answer must be one of the options.
fn parse_question(spec: &str) -> Result<QuizQuestion> {
    let parts: Vec<&str> = spec.split('|').collect();
    let &[question, options, answer] = parts.as_slice() else {
        return Err(anyhow!(
            "Invalid question spec: {spec}\nExpected \"question|option1,option2,...|answer\""
        ));
    };

    let options: Vec<String> = options
        .split(',')
        .map(str::trim)
        .filter(|option| !option.is_empty())
        .map(ToString::to_string)
        .collect();
    if options.len() < 2 {
        return Err(anyhow!("Question needs at least two options: {spec}"));
    }

    let answer = answer.trim().to_string();
    if !options.contains(&answer) {
        return Err(anyhow!("Answer must be one of the options: {spec}"));
    }

    Ok(QuizQuestion {
        question: question.trim().to_string(),
        options,
        answer,
    })
}

pub fn list(db: &Database) -> Vec<Module> {
    db.list_modules().into_iter().cloned().collect()
}

pub fn show(module_id: &str, db: &Database) -> Result<Module> {
    fetch(module_id, db)
}

pub fn quiz(module_id: &str, answers: &[String], db: &Database) -> Result<QuizReport> {
    let module = fetch(module_id, db)?;
    if module.quiz.is_empty() {
        return Err(anyhow!("Module has no quiz: {module_id}"));
    }
    let score = module.grade(answers);
    Ok(QuizReport { module, score })
}

fn fetch(module_id: &str, db: &Database) -> Result<Module> {
    if let Some(module) = db.get_module(module_id) {
        return Ok(module.clone());
    }

    let all_ids = db.all_module_ids();
    let candidates: Vec<&str> = all_ids.iter().map(String::as_str).collect();
    if let Some(suggestion) = find_similar_id(module_id, &candidates) {
        Err(anyhow!("Module not found: {module_id}\nDid you mean: {suggestion}"))
    } else {
        Err(anyhow!("Module not found: {module_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    fn session(role: Role) -> Session {
        Session::new("author".to_string(), role)
    }

    #[fixture]
    fn db() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let calma = dir.path().join(".calma");
        std::fs::create_dir_all(&calma).unwrap();
        let db = Database::open(&calma).unwrap();
        db.init_schema().unwrap();
        (dir, db)
    }

    fn sleep_module(db: &mut Database) -> Module {
        create(
            "Sleep hygiene".to_string(),
            "basics".to_string(),
            "long form".to_string(),
            None,
            &[
                "How many hours?|6,8,12|8".to_string(),
                "Screens before bed?|yes,no|no".to_string(),
            ],
            &session(Role::Expert),
            db,
        )
        .unwrap()
    }

    #[rstest]
    fn create_requires_expert_or_admin(db: (TempDir, Database)) {
        let (_dir, mut db) = db;
        let result = create(
            "t".to_string(),
            "d".to_string(),
            "c".to_string(),
            None,
            &[],
            &session(Role::User),
            &mut db,
        );
        assert!(result.is_err());

        assert!(
            create(
                "t".to_string(),
                "d".to_string(),
                "c".to_string(),
                None,
                &[],
                &session(Role::Admin),
                &mut db,
            )
            .is_ok()
        );
    }

    #[rstest]
    #[case::missing_parts("question only")]
    #[case::one_option("q|only|only")]
    #[case::answer_not_an_option("q|a,b|c")]
    fn create_rejects_malformed_questions(db: (TempDir, Database), #[case] spec: &str) {
        let (_dir, mut db) = db;
        let result = create(
            "t".to_string(),
            "d".to_string(),
            "c".to_string(),
            None,
            &[spec.to_string()],
            &session(Role::Expert),
            &mut db,
        );
        assert!(result.is_err());
    }

    #[rstest]
    fn quiz_grades_in_question_order(db: (TempDir, Database)) {
        let (_dir, mut db) = db;
        let module = sleep_module(&mut db);

        let report = quiz(
            &module.id,
            &["8".to_string(), "yes".to_string()],
            &db,
        )
        .unwrap();
        assert_eq!(report.score.correct, 1);
        assert_eq!(report.score.total, 2);
    }

    #[rstest]
    fn quiz_on_module_without_quiz_fails(db: (TempDir, Database)) {
        let (_dir, mut db) = db;
        let module = create(
            "No quiz".to_string(),
            "d".to_string(),
            "c".to_string(),
            None,
            &[],
            &session(Role::Expert),
            &mut db,
        )
        .unwrap();
        assert!(quiz(&module.id, &[], &db).is_err());
    }

    #[rstest]
    fn show_unknown_module_fails(db: (TempDir, Database)) {
        let (_dir, db) = db;
        assert!(show("nonexistent", &db).is_err());
    }
}

//! `GET /quiz-data`: attempt counts and mean scores per subject as JSON.

use std::collections::BTreeMap;

use axum::{Json, extract::State};
use quizmaster_core::{attempt::SubjectStats, store::QuizStore};
use serde::Serialize;

use crate::{AppState, error::Error};

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct QuizData {
  pub attempts_per_subject:   BTreeMap<String, u64>,
  pub avg_scores_per_subject: BTreeMap<String, f64>,
}

impl FromIterator<SubjectStats> for QuizData {
  fn from_iter<I: IntoIterator<Item = SubjectStats>>(iter: I) -> Self {
    let mut data = QuizData::default();
    for stats in iter {
      data.attempts_per_subject.insert(stats.subject.clone(), stats.attempts);
      data
        .avg_scores_per_subject
        .insert(stats.subject, stats.average_score);
    }
    data
  }
}

pub async fn quiz_data<S: QuizStore>(
  State(state): State<AppState<S>>,
) -> Result<Json<QuizData>, Error> {
  let stats = state.store.subject_stats().await.map_err(Error::store)?;
  Ok(Json(stats.into_iter().collect()))
}

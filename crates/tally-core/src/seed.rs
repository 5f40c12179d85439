//! The canonical starter rubric provisioned for every new organization.

use uuid::Uuid;

use crate::rubric::{Criterion, Level, NewRubric};

const NAME: &str = "Rubrica padrão";
const DESCRIPTION: &str =
  "Rubrica inicial para avaliação de respostas dissertativas.";

/// Percentage tiers shared by the quality criteria.
const QUALITY_LEVELS: [(&str, f64, &str); 4] = [
  ("Excelente", 100.0, "Atende plenamente ao critério."),
  ("Bom", 75.0, "Atende ao critério com pequenas falhas."),
  ("Regular", 50.0, "Atende parcialmente ao critério."),
  ("Insuficiente", 25.0, "Não atende ao critério."),
];

const COMPLETENESS_LEVELS: [(&str, f64, &str); 4] = [
  ("Completa", 100.0, "Responde a todas as partes da questão."),
  ("Quase completa", 75.0, "Omite um aspecto secundário."),
  ("Parcial", 50.0, "Responde apenas parte da questão."),
  ("Incompleta", 25.0, "Deixa a maior parte da questão sem resposta."),
];

fn levels(tiers: &[(&str, f64, &str)]) -> Vec<Level> {
  tiers
    .iter()
    .map(|(label, points, description)| Level {
      label:       (*label).to_owned(),
      points:      *points,
      description: (*description).to_owned(),
    })
    .collect()
}

fn criterion(
  name: &str,
  description: &str,
  max_points: f64,
  tiers: &[(&str, f64, &str)],
) -> Criterion {
  Criterion {
    name: name.to_owned(),
    description: description.to_owned(),
    max_points,
    levels: levels(tiers),
  }
}

/// Four criteria worth 40/30/20/10 points, 100 in total, marked default.
pub fn default_rubric(organization_id: Uuid) -> NewRubric {
  NewRubric {
    organization_id,
    name: NAME.to_owned(),
    description: DESCRIPTION.to_owned(),
    is_default: true,
    criteria: vec![
      criterion(
        "Domínio do conteúdo",
        "Precisão e profundidade do conhecimento demonstrado.",
        40.0,
        &QUALITY_LEVELS,
      ),
      criterion(
        "Clareza e organização",
        "Estrutura lógica e expressão clara das ideias.",
        30.0,
        &QUALITY_LEVELS,
      ),
      criterion(
        "Argumentação",
        "Uso de evidências e justificativas.",
        20.0,
        &QUALITY_LEVELS,
      ),
      criterion(
        "Completude",
        "Cobertura de todas as partes da questão.",
        10.0,
        &COMPLETENESS_LEVELS,
      ),
    ],
  }
}

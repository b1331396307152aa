//! Seven-day plan generation (investment strategies and meal plans).
//!
//! Both plans follow the same path: validate the form, render a prompt that
//! asks for a day-keyed JSON object, send it to a completion backend and
//! cut the JSON back out of the reply.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::clients::{CompletionProvider, LlmError};
use crate::parser::plan_json::{PlanJsonError, extract_plan};

/// Day name to that day's slots, in the order the model produced them.
pub type Plan = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    Investment,
    Meal,
}

impl PlanKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Investment => "investment",
            Self::Meal => "meal",
        }
    }
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("{0}")]
    Validation(String),

    #[error("{kind} plan generation failed: {source}")]
    Generation {
        kind: PlanKind,
        #[source]
        source: LlmError,
    },

    #[error("{kind} plan could not be extracted: {source}")]
    Extraction {
        kind: PlanKind,
        #[source]
        source: PlanJsonError,
    },
}

/// Accepts `7`, `7.5` and `"7"`; the web form has sent all three.
fn as_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentPlanRequest {
    pub investment_goal: Option<String>,
    pub risk_tolerance: Option<Value>,
    pub investment_constraints: Option<String>,
    pub preferred_markets: Option<String>,
    #[serde(default)]
    pub include_alternatives: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanRequest {
    pub diet_type: Option<String>,
    pub calories: Option<Value>,
    pub allergies: Option<String>,
    pub cuisine: Option<String>,
    #[serde(default)]
    pub snacks: bool,
}

impl InvestmentPlanRequest {
    pub fn build_prompt(&self) -> Result<String, PlanError> {
        let goal = non_blank(self.investment_goal.as_deref())
            .ok_or_else(|| PlanError::Validation("Investment goal is required.".to_string()))?;

        let risk = as_number(self.risk_tolerance.as_ref())
            .filter(|r| (1.0..=10.0).contains(r))
            .ok_or_else(|| {
                PlanError::Validation("Risk tolerance must be a number from 1 to 10.".to_string())
            })?;

        let constraints = non_blank(self.investment_constraints.as_deref()).unwrap_or("none");
        let markets = non_blank(self.preferred_markets.as_deref()).unwrap_or("no preference");
        let alt = self.include_alternatives;

        let alternatives_line = if alt {
            "Include suggestions for alternative investment strategies if applicable."
        } else {
            ""
        };
        let alternatives_slot = if alt {
            "- Alternative strategies (if applicable)"
        } else {
            ""
        };
        let alternatives_key = if alt { ", and \"Alternative\"" } else { "" };

        Ok(format!(
            r#"You are a professional financial advisor. Create a 7-day investment strategy plan for an individual with the following details:

Investment Goal: {goal}
Risk Tolerance (1-10): {risk}
Investment Constraints: {constraints}
Preferred Markets: {markets}
{alternatives_line}

For each day, provide recommended strategies for:
  - Morning (e.g., analyzing pre-market trends, setting entry points)
  - Afternoon (e.g., monitoring positions, adjusting stops)
  - Evening (e.g., reviewing performance, planning for the next day)
  {alternatives_slot}

Structure the response as a JSON object where each day is a key, and under each day include the strategies with keys "Morning", "Afternoon", "Evening"{alternatives_key}. Example:

{{
  "Monday": {{
    "Morning": "Review pre-market analysis and watch key indicators.",
    "Afternoon": "Monitor positions and adjust stop-loss orders.",
    "Evening": "Evaluate daily performance and plan adjustments.",
    "Alternative": "Consider options strategies in volatile markets."
  }},
  "Tuesday": {{
    "Morning": "Analyze global market trends and set entry points.",
    "Afternoon": "Rebalance portfolio based on midday data.",
    "Evening": "Review economic news for insight.",
    "Alternative": "Diversify with forex market insights."
  }}
}}

Return just the JSON with no extra commentaries and no backticks."#
        ))
    }
}

impl MealPlanRequest {
    pub fn build_prompt(&self) -> Result<String, PlanError> {
        let diet = non_blank(self.diet_type.as_deref())
            .ok_or_else(|| PlanError::Validation("Diet type is required.".to_string()))?;

        let calories = as_number(self.calories.as_ref())
            .filter(|c| *c > 0.0)
            .ok_or_else(|| {
                PlanError::Validation("Calories must be a positive number.".to_string())
            })?;

        let allergies = non_blank(self.allergies.as_deref()).unwrap_or("none");
        let cuisine = non_blank(self.cuisine.as_deref()).unwrap_or("no preference");
        let snacks = if self.snacks { "yes" } else { "no" };
        let snacks_slot = if self.snacks { "- Snacks" } else { "" };

        Ok(format!(
            r#"You are a professional nutritionist. Create a 7-day meal plan for an individual following a {diet} diet aiming for {calories} calories per day.

Allergies or restrictions: {allergies}.
Preferred cuisine: {cuisine}.
Snacks included: {snacks}.

For each day, provide:
  - Breakfast
  - Lunch
  - Dinner
  {snacks_slot}

Use simple ingredients and provide brief instructions. Include approximate calorie counts for each meal.

Structure the response as a JSON object where each day is a key, and each meal (Breakfast, Lunch, Dinner, Snacks) is a sub-key. Example:

{{
  "Monday": {{
    "Breakfast": "Oatmeal with fruits - 350 calories",
    "Lunch": "Grilled chicken salad - 500 calories",
    "Dinner": "Steamed vegetables with quinoa - 600 calories",
    "Snacks": "Greek yogurt - 150 calories"
  }},
  "Tuesday": {{
    "Breakfast": "Smoothie bowl - 300 calories",
    "Lunch": "Turkey sandwich - 450 calories",
    "Dinner": "Baked salmon with asparagus - 700 calories",
    "Snacks": "Almonds - 200 calories"
  }}
}}

Return just the JSON with no extra commentaries and no backticks."#
        ))
    }
}

pub struct PlanService {
    investment_llm: Arc<dyn CompletionProvider>,
    meal_llm: Arc<dyn CompletionProvider>,
}

impl PlanService {
    #[must_use]
    pub fn new(
        investment_llm: Arc<dyn CompletionProvider>,
        meal_llm: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            investment_llm,
            meal_llm,
        }
    }

    pub async fn investment_plan(&self, request: &InvestmentPlanRequest) -> Result<Plan, PlanError> {
        let prompt = request.build_prompt()?;
        self.generate(PlanKind::Investment, self.investment_llm.as_ref(), &prompt)
            .await
    }

    pub async fn meal_plan(&self, request: &MealPlanRequest) -> Result<Plan, PlanError> {
        let prompt = request.build_prompt()?;
        self.generate(PlanKind::Meal, self.meal_llm.as_ref(), &prompt)
            .await
    }

    async fn generate(
        &self,
        kind: PlanKind,
        llm: &dyn CompletionProvider,
        prompt: &str,
    ) -> Result<Plan, PlanError> {
        info!("Generating {} plan with {}", kind, llm.model());

        let content = llm
            .complete(prompt)
            .await
            .map_err(|source| PlanError::Generation { kind, source })?;
        debug!("Raw {} plan reply: {}", kind, content);

        let plan = extract_plan(&content).map_err(|source| {
            error!("Could not extract {} plan: {}", kind, source);
            PlanError::Extraction { kind, source }
        })?;

        info!("Generated {} plan covering {} days", kind, plan.len());
        Ok(plan)
    }
}

// service/matching_service.rs
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::{
        activitydb::ActivityExt,
        cache::{recommendation_key, CacheHelper, RECO_CACHE_TTL},
        db::DBClient,
        jobdb::JobExt,
        profiledb::ProfileExt,
        userdb::UserExt,
    },
    dtos::jobdtos::RecommendRequestDto,
    models::{
        jobmodel::{Job, JobState},
        usermodel::User,
    },
    service::error::ServiceError,
    utils::{
        geo::{haversine_km, Coordinates},
        keys::sanitize_email,
        parsing::{parse_budget, parse_experience_level},
    },
};

pub const TOP_CANDIDATES: usize = 30;
pub const MAX_RECOMMENDATIONS: usize = 15;
pub const VIEWED_JOBS: i64 = 3;
const BUDGET_TOLERANCE: f64 = 0.2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedJob {
    pub job_id: Uuid,
    #[serde(rename = "jobTitle")]
    pub job_title: String,
    pub categories: String,
    pub location: String,
    pub distance_km: f64,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "skillsRequired")]
    pub skills_required: String,
    #[serde(rename = "budgetRange")]
    pub budget_range: f64,
    pub description: String,
    #[serde(rename = "experienceLevel")]
    pub experience_level: [f64; 2],
    #[serde(rename = "jobDate")]
    pub job_date: NaiveDate,
    pub semantic_score: f64,
    pub job_text: String,
}

/// What the ranking knows about the seeker.
#[derive(Debug, Clone)]
pub struct SeekerSignal {
    pub skills: Vec<String>,
    pub origin: Coordinates,
    pub experience: i32,
    pub budget: f64,
}

#[derive(Debug, Clone)]
pub struct MatchingService {
    db_client: Arc<DBClient>,
}

impl MatchingService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn recommend(&self, request: RecommendRequestDto) -> Result<Vec<RecommendedJob>, ServiceError> {
        let email = request.email.trim();
        let skills: Vec<String> = request
            .skills
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if email.is_empty() || skills.is_empty() || request.latitude == 0.0 || request.longitude == 0.0 {
            return Err(ServiceError::Validation("Missing required fields.".to_string()));
        }

        let candidates = self.db_client.get_geocoded_jobs().await?;
        let (viewed_jobs, viewed_count) = self.viewed_jobs(email).await?;

        let seeker = SeekerSignal {
            skills,
            origin: Coordinates::new(request.latitude, request.longitude),
            experience: request.experience,
            budget: request.budget,
        };

        let results = rank_jobs(&seeker, candidates, &viewed_jobs, viewed_count);
        tracing::debug!("Recommended {} jobs for {}", results.len(), email);

        if results.is_empty() {
            return Err(ServiceError::NotFound("No recommendations found.".to_string()));
        }
        Ok(results)
    }

    /// Recommendations built from the stored seeker profile, cached per seeker.
    pub async fn recommend_for_seeker(&self, seeker: &User) -> Result<Vec<RecommendedJob>, ServiceError> {
        let cache_key = recommendation_key(seeker.id);
        if let Some(redis) = &self.db_client.redis_client {
            match CacheHelper::get::<Vec<RecommendedJob>>(redis, &cache_key).await {
                Ok(Some(cached)) => return Ok(cached),
                Ok(None) => {}
                Err(e) => tracing::warn!("Recommendation cache read failed: {}", e),
            }
        }

        let profile = self
            .db_client
            .get_seeker_profile(seeker.id)
            .await?
            .ok_or(ServiceError::ProfileNotFound)?;

        let request = RecommendRequestDto {
            email: seeker.email.clone(),
            skills: profile.skills,
            latitude: profile.latitude.unwrap_or(0.0),
            longitude: profile.longitude.unwrap_or(0.0),
            experience: profile.experience_years,
            budget: parse_budget(&profile.expected_pay_range),
        };

        let results = self.recommend(request).await?;

        if let Some(redis) = &self.db_client.redis_client {
            if let Err(e) = CacheHelper::set(redis, &cache_key, &results, RECO_CACHE_TTL).await {
                tracing::warn!("Recommendation cache write failed: {}", e);
            }
        }
        Ok(results)
    }

    /// The seeker's most viewed current jobs, plus how many viewed jobs
    /// were considered (including ones no longer current).
    async fn viewed_jobs(&self, email: &str) -> Result<(Vec<Job>, usize), ServiceError> {
        let email_key = sanitize_email(email);
        let Some(user) = self
            .db_client
            .get_user(None, Some(email_key.as_str()), None)
            .await?
        else {
            return Ok((Vec::new(), 0));
        };

        let activity = self.db_client.get_top_viewed(user.id, VIEWED_JOBS).await?;
        if activity.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let ids: Vec<Uuid> = activity.iter().map(|a| a.job_id).collect();
        let jobs = self
            .db_client
            .get_jobs_by_ids(&ids)
            .await?
            .into_iter()
            .filter(|job| job.state == JobState::Current)
            .collect();

        Ok((jobs, activity.len()))
    }
}

struct Candidate {
    job: Job,
    coordinates: Coordinates,
    distance_km: f64,
    experience: [f64; 2],
    skills_text: String,
    text: String,
    terms: TermVector,
    semantic_score: f64,
    final_score: f64,
}

impl Candidate {
    fn into_recommendation(self) -> RecommendedJob {
        RecommendedJob {
            job_id: self.job.id,
            job_title: self.job.job_title,
            categories: self.job.categories,
            location: self.job.location,
            distance_km: self.distance_km,
            latitude: self.coordinates.lat,
            longitude: self.coordinates.lng,
            skills_required: self.skills_text,
            budget_range: self.job.budget_value,
            description: self.job.description,
            experience_level: self.experience,
            job_date: self.job.job_date,
            semantic_score: self.semantic_score,
            job_text: self.text,
        }
    }
}

/// Hybrid ranking: semantic, title and skill scores pick the top candidates,
/// skill matches are promoted (budget fit first, then nearest), and viewing
/// history reorders everything else.
pub fn rank_jobs(
    seeker: &SeekerSignal,
    jobs: Vec<Job>,
    viewed_jobs: &[Job],
    viewed_count: usize,
) -> Vec<RecommendedJob> {
    let mut candidates: Vec<Candidate> = jobs
        .into_iter()
        .filter_map(|job| {
            let coordinates = Coordinates::from_parts(job.latitude, job.longitude)?;
            if coordinates.lat == 0.0 || coordinates.lng == 0.0 {
                return None;
            }
            let distance_km = haversine_km(seeker.origin, coordinates);
            let experience = parse_experience_level(job.experience_level.as_deref().unwrap_or(""));
            let skills_text = job.skills_required.join(" ");
            let text = job_text(&job, &skills_text, experience, distance_km);
            let terms = TermVector::from_text(&text);
            Some(Candidate {
                job,
                coordinates,
                distance_km,
                experience,
                skills_text,
                text,
                terms,
                semantic_score: 0.0,
                final_score: 0.0,
            })
        })
        .collect();

    if candidates.is_empty() {
        return Vec::new();
    }

    let user_terms = TermVector::from_text(&user_text(seeker));
    let semantic_raw: Vec<f64> = candidates.iter().map(|c| user_terms.cosine(&c.terms)).collect();
    let title_raw: Vec<f64> = candidates
        .iter()
        .map(|c| title_score(&c.job.job_title, &seeker.skills) as f64)
        .collect();
    let skill_raw: Vec<f64> = candidates
        .iter()
        .map(|c| skill_match(&c.job.skills_required, &seeker.skills) as f64)
        .collect();

    let semantic = min_max_normalize(&semantic_raw);
    let title = min_max_normalize(&title_raw);
    let skill = min_max_normalize(&skill_raw);
    for (i, candidate) in candidates.iter_mut().enumerate() {
        candidate.semantic_score = semantic[i];
        candidate.final_score = semantic[i] + title[i] + skill[i];
    }

    let mut by_score: Vec<usize> = (0..candidates.len()).collect();
    by_score.sort_by(|&a, &b| candidates[b].final_score.total_cmp(&candidates[a].final_score));
    by_score.truncate(TOP_CANDIDATES);

    let lowered_skills: Vec<String> = seeker.skills.iter().map(|s| s.to_lowercase()).collect();
    let (matched, mut non_matched): (Vec<usize>, Vec<usize>) = by_score.into_iter().partition(|&i| {
        let text = candidates[i].skills_text.to_lowercase();
        lowered_skills.iter().any(|skill| text.contains(skill.as_str()))
    });

    let lower = seeker.budget * (1.0 - BUDGET_TOLERANCE);
    let upper = seeker.budget * (1.0 + BUDGET_TOLERANCE);
    let (mut in_budget, mut out_of_budget): (Vec<usize>, Vec<usize>) = matched.into_iter().partition(|&i| {
        let budget = candidates[i].job.budget_value;
        budget >= lower && budget <= upper
    });
    in_budget.sort_by(|&a, &b| candidates[a].distance_km.total_cmp(&candidates[b].distance_km));
    out_of_budget.sort_by(|&a, &b| candidates[a].distance_km.total_cmp(&candidates[b].distance_km));
    let matched: Vec<usize> = in_budget.into_iter().chain(out_of_budget).collect();

    if viewed_count > 0 {
        let matched_ids: HashSet<Uuid> = matched.iter().map(|&i| candidates[i].job.id).collect();
        let references: Vec<TermVector> = viewed_jobs
            .iter()
            .map(|job| {
                let skills_text = job.skills_required.join(" ");
                let experience = parse_experience_level(job.experience_level.as_deref().unwrap_or(""));
                TermVector::from_text(&job_text(job, &skills_text, experience, 0.0))
            })
            .collect();

        let mut remaining: Vec<usize> = (0..candidates.len())
            .filter(|&i| !matched_ids.contains(&candidates[i].job.id))
            .collect();

        let mut affinity: HashMap<usize, f64> = HashMap::new();
        for &i in &remaining {
            let total: f64 = references.iter().map(|r| r.cosine(&candidates[i].terms)).sum();
            affinity.insert(i, total / viewed_count as f64);
        }
        remaining.sort_by(|a, b| affinity[b].total_cmp(&affinity[a]));
        for (&i, &score) in &affinity {
            candidates[i].semantic_score = score;
        }

        let mut seen = HashSet::new();
        non_matched = remaining
            .into_iter()
            .chain(non_matched)
            .filter(|&i| seen.insert(candidates[i].job.id))
            .collect();
    }

    let order: Vec<usize> = matched
        .into_iter()
        .chain(non_matched)
        .take(MAX_RECOMMENDATIONS)
        .collect();

    let mut slots: Vec<Option<Candidate>> = candidates.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .map(Candidate::into_recommendation)
        .collect()
}

fn job_text(job: &Job, skills_text: &str, experience: [f64; 2], distance_km: f64) -> String {
    format!(
        "{title}{title}{desc}{desc}Required Skills: {skills}. Experience Required: {min} to {max} years. \
         Budget Offered: ₹{budget}. Location: {location} ({km} km away).",
        title = format!("Job Title: {}. ", job.job_title),
        desc = format!("Description: {}. ", job.description),
        skills = skills_text,
        min = experience[0],
        max = experience[1],
        budget = job.budget_value,
        location = job.location,
        km = distance_km.trunc() as i64,
    )
}

fn user_text(seeker: &SeekerSignal) -> String {
    format!(
        "Skills: {}. {} years of experience. Expected budget: ₹{}. User is located at latitude {} and longitude {}.",
        seeker.skills.join(", "),
        seeker.experience,
        seeker.budget,
        seeker.origin.lat,
        seeker.origin.lng,
    )
}

/// Number of seeker skills that appear in the title.
pub fn title_score(title: &str, skills: &[String]) -> usize {
    let title = title.to_lowercase();
    skills
        .iter()
        .filter(|skill| title.contains(skill.to_lowercase().as_str()))
        .count()
}

/// Size of the case-insensitive intersection of two skill lists.
pub fn skill_match(job_skills: &[String], user_skills: &[String]) -> usize {
    let job: HashSet<String> = job_skills.iter().map(|s| s.trim().to_lowercase()).collect();
    let user: HashSet<String> = user_skills.iter().map(|s| s.trim().to_lowercase()).collect();
    job.intersection(&user).count()
}

/// Scales into [0, 1]. A column with no spread scores 0 everywhere.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    values
        .iter()
        .map(|v| if range > 0.0 { (v - min) / range } else { 0.0 })
        .collect()
}

/// Term-frequency vector over lowercase alphanumeric tokens.
#[derive(Debug, Clone, Default)]
pub struct TermVector {
    counts: HashMap<String, f64>,
    norm: f64,
}

impl TermVector {
    pub fn from_text(text: &str) -> Self {
        let mut counts: HashMap<String, f64> = HashMap::new();
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            *counts.entry(token.to_lowercase()).or_insert(0.0) += 1.0;
        }
        let norm = counts.values().map(|c| c * c).sum::<f64>().sqrt();
        Self { counts, norm }
    }

    pub fn cosine(&self, other: &TermVector) -> f64 {
        if self.norm == 0.0 || other.norm == 0.0 {
            return 0.0;
        }
        let (small, large) = if self.counts.len() <= other.counts.len() {
            (&self.counts, &other.counts)
        } else {
            (&other.counts, &self.counts)
        };
        let dot: f64 = small
            .iter()
            .filter_map(|(term, a)| large.get(term).map(|b| a * b))
            .sum();
        dot / (self.norm * other.norm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::jobmodel::JobType;
    use chrono::Utc;

    const PUNE: Coordinates = Coordinates { lat: 18.5204, lng: 73.8567 };

    fn job(title: &str, skills: &[&str], budget: f64, lat: f64, lng: f64) -> Job {
        let now = Utc::now();
        Job {
            id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            provider_email: "owner@example.com".to_string(),
            job_title: title.to_string(),
            job_type: JobType::PartTime,
            categories: "Home services".to_string(),
            skills_required: skills.iter().map(|s| s.to_string()).collect(),
            experience_level: Some("1-2 years".to_string()),
            budget_range: budget.to_string(),
            budget_value: budget,
            location: "Pune".to_string(),
            pincode: "411001".to_string(),
            latitude: Some(lat),
            longitude: Some(lng),
            job_date: "2026-11-20".parse().unwrap(),
            apply_by: "2026-11-15".parse().unwrap(),
            description: format!("{} work in Pune", title),
            contact_person_name: "Meera".to_string(),
            contact_person_phone: "9876543210".to_string(),
            state: JobState::Current,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    fn seeker(skills: &[&str], budget: f64) -> SeekerSignal {
        SeekerSignal {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            origin: PUNE,
            experience: 2,
            budget,
        }
    }

    fn titles(results: &[RecommendedJob]) -> Vec<&str> {
        results.iter().map(|r| r.job_title.as_str()).collect()
    }

    #[test]
    fn matched_jobs_prefer_budget_fit_then_distance() {
        let jobs = vec![
            job("Plumber far", &["Plumbing"], 1000.0, 18.60, 73.8567),
            job("Plumber pricey", &["Plumbing"], 5000.0, 18.521, 73.8567),
            job("Plumber near", &["Plumbing"], 1100.0, 18.53, 73.8567),
            job("Carpenter", &["Carpentry"], 1000.0, 18.525, 73.8567),
        ];

        let results = rank_jobs(&seeker(&["plumbing"], 1000.0), jobs, &[], 0);
        assert_eq!(
            titles(&results),
            vec!["Plumber near", "Plumber far", "Plumber pricey", "Carpenter"]
        );
    }

    #[test]
    fn jobs_without_coordinates_are_skipped() {
        let mut unplaced = job("Plumber", &["Plumbing"], 1000.0, 0.0, 0.0);
        unplaced.latitude = None;
        let zero = job("Plumber zero", &["Plumbing"], 1000.0, 0.0, 73.0);

        let results = rank_jobs(&seeker(&["plumbing"], 1000.0), vec![unplaced, zero], &[], 0);
        assert!(results.is_empty());
    }

    #[test]
    fn output_is_capped() {
        let jobs: Vec<Job> = (0..40)
            .map(|i| job(&format!("Painter {}", i), &["Painting"], 800.0, 18.5 + i as f64 * 0.001, 73.85))
            .collect();

        let results = rank_jobs(&seeker(&["painting"], 800.0), jobs, &[], 0);
        assert_eq!(results.len(), MAX_RECOMMENDATIONS);
    }

    #[test]
    fn viewing_history_reorders_unmatched_jobs() {
        let electrician = job("Electrician", &["Wiring", "Electrical"], 900.0, 18.53, 73.86);
        let jobs = vec![
            job("Plumber", &["Plumbing"], 1000.0, 18.52, 73.85),
            job("Gardener", &["Gardening"], 700.0, 18.521, 73.8567),
            electrician.clone(),
        ];

        let results = rank_jobs(&seeker(&["plumbing"], 1000.0), jobs, &[electrician], 1);
        assert_eq!(titles(&results), vec!["Plumber", "Electrician", "Gardener"]);
        assert!(results[1].semantic_score > results[2].semantic_score);
    }

    #[test]
    fn reported_fields_follow_the_job() {
        let results = rank_jobs(
            &seeker(&["plumbing"], 1000.0),
            vec![job("Plumber", &["Plumbing", "Fitting"], 1250.0, 18.53, 73.8567)],
            &[],
            0,
        );
        let first = &results[0];
        assert_eq!(first.skills_required, "Plumbing Fitting");
        assert_eq!(first.budget_range, 1250.0);
        assert_eq!(first.experience_level, [1.0, 2.0]);
        assert!(first.distance_km > 0.9 && first.distance_km < 1.2);
        assert!(first.job_text.starts_with("Job Title: Plumber. Job Title: Plumber. "));
    }

    #[test]
    fn scoring_helpers() {
        let skills = vec!["Plumb".to_string(), "tiling".to_string()];
        assert_eq!(title_score("Plumber needed", &skills), 1);
        assert_eq!(
            skill_match(&["Tiling ".to_string(), "Masonry".to_string()], &skills),
            1
        );
        assert_eq!(min_max_normalize(&[2.0, 2.0]), vec![0.0, 0.0]);
        assert_eq!(min_max_normalize(&[1.0, 3.0, 2.0]), vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn cosine_similarity_bounds() {
        let a = TermVector::from_text("plumbing repair Pune");
        let b = TermVector::from_text("Plumbing, repair; pune!");
        let c = TermVector::from_text("garden landscaping");
        assert!((a.cosine(&b) - 1.0).abs() < 1e-9);
        assert_eq!(a.cosine(&c), 0.0);
        assert_eq!(a.cosine(&TermVector::default()), 0.0);
    }
}

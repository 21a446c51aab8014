//! Duplicate detection for newly geocoded places.
//!
//! Candidates are places within a radius of the new point. Among them an
//! exact case-insensitive name match wins, then the best trigram match
//! above the similarity threshold, then simply the nearest place.

pub mod similarity;

use rusqlite::Connection;
use serde::Serialize;

use crate::config::DedupConfig;
use crate::db::place_repo::{self, PlaceRow};
use crate::db::{Database, DatabaseError};
use crate::geo::{BoundingBox, GeoPoint};

pub use similarity::similarity;

/// Why a candidate was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchReason {
    Exact,
    Similar { score: f64 },
    Nearest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateMatch {
    pub place: PlaceRow,
    pub reason: MatchReason,
    pub distance_m: f64,
}

struct Candidate {
    place: PlaceRow,
    distance_m: f64,
}

#[derive(Clone)]
pub struct DuplicateResolver {
    db: Database,
    radius_m: f64,
    similarity_threshold: f64,
}

impl DuplicateResolver {
    pub fn new(db: Database, config: &DedupConfig) -> Self {
        Self {
            db,
            radius_m: config.radius_meters,
            similarity_threshold: config.similarity_threshold,
        }
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Looks for an existing place matching the point and optional name.
    pub fn find_duplicate(
        &self,
        point: GeoPoint,
        name: Option<&str>,
    ) -> Result<Option<DuplicateMatch>, DatabaseError> {
        self.db
            .with_conn(|conn| self.find_duplicate_with(conn, point, name))
    }

    /// Same as [`find_duplicate`](Self::find_duplicate) on a caller-held
    /// connection, e.g. inside an open transaction.
    pub fn find_duplicate_with(
        &self,
        conn: &Connection,
        point: GeoPoint,
        name: Option<&str>,
    ) -> Result<Option<DuplicateMatch>, DatabaseError> {
        let mut nearby = Vec::new();
        for bounds in BoundingBox::around(point, self.radius_m).split_at_antimeridian() {
            nearby.extend(place_repo::find_in_bounds(conn, &bounds)?);
        }
        let mut candidates: Vec<Candidate> = nearby
            .into_iter()
            .filter_map(|place| {
                let distance_m = place.point()?.distance_m(&point);
                (distance_m <= self.radius_m).then_some(Candidate { place, distance_m })
            })
            .collect();
        if candidates.is_empty() {
            return Ok(None);
        }
        // Nearest first, lowest id breaks ties.
        candidates.sort_by(|a, b| {
            a.distance_m
                .total_cmp(&b.distance_m)
                .then(a.place.id.cmp(&b.place.id))
        });

        let name = name.map(str::trim).filter(|n| !n.is_empty());
        if let Some(name) = name {
            if let Some(found) = self.match_by_name(&candidates, name) {
                return Ok(Some(found));
            }
        }

        let nearest = candidates.swap_remove(0);
        Ok(Some(DuplicateMatch {
            place: nearest.place,
            reason: MatchReason::Nearest,
            distance_m: nearest.distance_m,
        }))
    }

    fn match_by_name(&self, candidates: &[Candidate], name: &str) -> Option<DuplicateMatch> {
        let wanted = name.to_lowercase();
        if let Some(exact) = candidates
            .iter()
            .find(|c| c.place.name.trim().to_lowercase() == wanted)
        {
            return Some(DuplicateMatch {
                place: exact.place.clone(),
                reason: MatchReason::Exact,
                distance_m: exact.distance_m,
            });
        }

        let mut best: Option<(&Candidate, f64)> = None;
        for candidate in candidates {
            let score = similarity(name, &candidate.place.name);
            if score <= self.similarity_threshold {
                continue;
            }
            let better = match best {
                None => true,
                Some((current, current_score)) => {
                    score > current_score
                        || (score == current_score && candidate.place.id < current.place.id)
                }
            };
            if better {
                best = Some((candidate, score));
            }
        }

        best.map(|(c, score)| DuplicateMatch {
            place: c.place.clone(),
            reason: MatchReason::Similar { score },
            distance_m: c.distance_m,
        })
    }
}

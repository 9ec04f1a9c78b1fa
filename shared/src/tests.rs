#[cfg(test)]
mod tests {
    use time::macros::datetime;
    use uuid::Uuid;
    use crate::{
        AdminSummary, CandidateFilter, CandidateRoster, Tally, TallySource,
        ValidationError, VoterQuery, VoterRecord, VoterSession, DEFAULT_CANDIDATES,
        validate_candidate, percentage_label,
    };

    fn roster(names: &[&str]) -> CandidateRoster {
        CandidateRoster::new(names.iter().copied()).unwrap()
    }

    fn voter(name: &str, address: &str, voted_for: Option<&str>) -> VoterRecord {
        VoterRecord {
            id: Uuid::new_v4(),
            name: name.into(),
            address: address.into(),
            voted_for: voted_for.map(Into::into),
            created_at: datetime!(2025-03-05 14:07 UTC),
        }
    }

    fn sample_voters() -> Vec<VoterRecord> {
        vec![
            voter("Budi", "Jl. Merdeka 1", Some("A")),
            voter("Ani Smith", "Jl. Mawar 2", None),
            voter("Joko", "12 Smith St", Some("B")),
            voter("Sari", "Jl. Melati 3", Some("A")),
            voter("Tono", "Jl. Kenanga 4", None),
        ]
    }

    #[test]
    fn test_default_roster() {
        let r = CandidateRoster::default();
        assert_eq!(r.len(), DEFAULT_CANDIDATES.len());
        assert_eq!(r.iter().next(), Some("Erich"));
        assert_eq!(r.iter().last(), Some("Benedecta"));
        assert!(r.contains("Daniel 2"));
        assert!(!r.contains("daniel 2"));
        assert!(CandidateRoster::new(DEFAULT_CANDIDATES.iter().copied()).is_ok());
    }

    #[test]
    fn test_roster_validation() {
        let dup = CandidateRoster::new(["A", "B", "A"]).unwrap_err();
        assert_eq!(dup, ValidationError::DuplicateCandidate("A".into()));

        let empty = CandidateRoster::new(Vec::<String>::new()).unwrap_err();
        assert_eq!(empty, ValidationError::EmptyRoster);

        assert!(CandidateRoster::new(["A", " "]).is_err());
        assert_eq!(roster(&["B", "A"]).iter().collect::<Vec<_>>(), vec!["B", "A"]);
    }

    #[test]
    fn test_roster_serializes_as_list() {
        let json = serde_json::to_string(&roster(&["A", "B"])).unwrap();
        assert_eq!(json, r#"["A","B"]"#);
    }

    #[test]
    fn test_candidate_validation() {
        let r = roster(&["A", "B"]);
        assert!(validate_candidate(&r, "A").is_ok());
        assert_eq!(validate_candidate(&r, ""), Err(ValidationError::EmptyCandidate));
        assert_eq!(
            validate_candidate(&r, "C"),
            Err(ValidationError::UnknownCandidate("C".into()))
        );
    }

    #[test]
    fn test_single_vote_tally() {
        let r = roster(&["A", "B"]);
        let tally = Tally::from_choices(&r, ["A"], TallySource::Live);
        assert_eq!(tally.count_for("A"), 1);
        assert_eq!(tally.count_for("B"), 0);
        assert_eq!(tally.total_votes(), 1);
        assert_eq!(tally.percentage_label_for("A"), "100.0");
        assert_eq!(tally.percentage_label_for("B"), "0.0");
    }

    #[test]
    fn test_tally_sums_to_total() {
        let r = roster(&["A", "B", "C"]);
        let choices = ["A", "C", "A", "B", "A", "C", "C"];
        let tally = Tally::from_choices(&r, choices, TallySource::Live);

        let sum: usize = tally.counts().iter().map(|c| c.count).sum();
        assert_eq!(sum, choices.len());
        assert_eq!(tally.total_votes(), choices.len());

        let pct: f64 = r.iter().map(|c| tally.percentage_for(c)).sum();
        assert!((pct - 100.0).abs() < 1e-9);

        let rounded: f64 = tally.view().candidates.iter()
            .map(|row| row.percentage.parse::<f64>().unwrap())
            .sum();
        assert!((rounded - 100.0).abs() <= 0.2);
    }

    #[test]
    fn test_tally_follows_roster_order() {
        let r = roster(&["C", "A", "B"]);
        let tally = Tally::from_choices(&r, ["B", "B", "A"], TallySource::Live);
        let names: Vec<_> = tally.counts().iter().map(|c| c.candidate_name.as_str()).collect();
        assert_eq!(names, ["C", "A", "B"]);
        assert_eq!(tally.counts()[2].count, 2);
    }

    #[test]
    fn test_zeroed_tally() {
        let r = roster(&["A", "B"]);
        let tally = Tally::zeroed(&r, TallySource::Fallback);
        assert_eq!(tally.total_votes(), 0);
        assert!(tally.counts().iter().all(|c| c.count == 0));
        assert_eq!(tally.counts().len(), 2);
        assert_eq!(tally.source(), TallySource::Fallback);
        assert_eq!(percentage_label(0, 0), "0.0");
    }

    #[test]
    fn test_off_roster_choice_counts_toward_total_only() {
        let r = roster(&["A", "B"]);
        let tally = Tally::from_choices(&r, ["A", "Z"], TallySource::Live);
        assert_eq!(tally.total_votes(), 2);
        assert_eq!(tally.count_for("A"), 1);
        assert_eq!(tally.count_for("Z"), 0);
        assert_eq!(tally.percentage_label_for("A"), "50.0");
    }

    #[test]
    fn test_unfiltered_query_returns_snapshot() {
        let voters = sample_voters();
        let query = VoterQuery::default();
        assert!(query.is_unfiltered());
        let result: Vec<_> = query.apply(&voters).into_iter().cloned().collect();
        assert_eq!(result, voters);
    }

    #[test]
    fn test_not_voted_filter() {
        let r = roster(&["A", "B"]);
        let voters = sample_voters();
        let query = VoterQuery::new("", CandidateFilter::NotVoted).unwrap();
        let not_voted = query.apply(&voters);
        assert_eq!(not_voted.len(), 2);
        assert!(not_voted.iter().all(|v| v.voted_for.is_none()));

        let summary = AdminSummary::from_snapshot(&r, &voters);
        let combined: usize = summary.candidate_counts.iter().map(|c| c.count).sum();
        assert_eq!(not_voted.len() + combined, voters.len());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let voters = sample_voters();
        let query = VoterQuery::new("smith", CandidateFilter::All).unwrap();
        let names: Vec<_> = query.apply(&voters).iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["Ani Smith", "Joko"]);

        let query = VoterQuery::new("MERDEKA", CandidateFilter::All).unwrap();
        assert_eq!(query.apply(&voters).len(), 1);
    }

    #[test]
    fn test_filters_combine_with_and() {
        let voters = sample_voters();
        let query = VoterQuery::new("smith", CandidateFilter::Candidate("B".into())).unwrap();
        let hits = query.apply(&voters);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Joko");

        let query = VoterQuery::new("smith", CandidateFilter::Candidate("A".into())).unwrap();
        assert!(query.apply(&voters).is_empty());

        let query = VoterQuery::new("jl.", CandidateFilter::Candidate("A".into())).unwrap();
        assert_eq!(query.apply(&voters).len(), 2);
    }

    #[test]
    fn test_candidate_filter_is_exact() {
        let voters = sample_voters();
        let query = VoterQuery::new("", CandidateFilter::Candidate("a".into())).unwrap();
        assert!(query.apply(&voters).is_empty());
    }

    #[test]
    fn test_summary_ignores_active_filter() {
        let r = roster(&["A", "B", "C"]);
        let voters = sample_voters();
        let summary = AdminSummary::from_snapshot(&r, &voters);
        assert_eq!(summary.total_voters, 5);
        assert_eq!(summary.total_voted, 3);
        assert_eq!(summary.total_not_voted, 2);
        assert_eq!(summary.count_for("A"), 2);
        assert_eq!(summary.count_for("C"), 0);

        let options = summary.selector_options();
        assert_eq!(options.len(), 2 + r.len());
        assert_eq!(options[0].value, "all");
        assert_eq!(options[0].label, "All voters (5)");
        assert_eq!(options[1].value, "not-voted");
        assert_eq!(options[1].count, 2);
        assert_eq!(options[2].label, "A (2 votes)");
    }

    #[test]
    fn test_candidate_filter_parsing() {
        let r = roster(&["A", "B"]);
        assert_eq!("all".parse::<CandidateFilter>().unwrap(), CandidateFilter::All);
        assert_eq!("".parse::<CandidateFilter>().unwrap(), CandidateFilter::All);
        assert_eq!("not-voted".parse::<CandidateFilter>().unwrap(), CandidateFilter::NotVoted);
        assert_eq!(CandidateFilter::parse_for(&r, "B").unwrap(), CandidateFilter::Candidate("B".into()));
        assert!(matches!(
            CandidateFilter::parse_for(&r, "Z"),
            Err(ValidationError::UnknownCandidate(_))
        ));
        assert_eq!(CandidateFilter::NotVoted.to_string(), "not-voted");
    }

    #[test]
    fn test_search_length_limit() {
        let long = "x".repeat(crate::MAX_SEARCH_LENGTH + 1);
        assert!(matches!(
            VoterQuery::new(long, CandidateFilter::All),
            Err(ValidationError::SearchTooLong)
        ));
    }

    #[test]
    fn test_registered_label() {
        let v = voter("Budi", "Jl. Merdeka 1", None);
        assert_eq!(v.registered_label(), "05 Mar 2025 14:07");
    }

    #[test]
    fn test_voter_session_header() {
        let id = Uuid::new_v4();
        assert_eq!(VoterSession::from_header(&format!(" {} ", id)).unwrap().voter_id, id);
        assert!(matches!(
            VoterSession::from_header("nope"),
            Err(ValidationError::InvalidVoterId(_))
        ));
    }
}

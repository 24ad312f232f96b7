// Unit tests for domain models

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::domain::errors::*;
    use crate::domain::model::*;
    use crate::domain::rules::SegmentationPlanner;

    fn clip(index: usize, duration_ms: u64) -> Clip {
        Clip::new(index, PathBuf::from(format!("/in/clip{}.mp4", index)), duration_ms)
    }

    #[test]
    fn test_clip_extension_from_path() {
        assert_eq!(clip(0, 1_000).extension, ".mp4");
        assert_eq!(Clip::new(0, PathBuf::from("/in/raw"), 1_000).extension, "");
        assert!(!clip(0, 1_000).has_audio);
        assert!(clip(0, 1_000).with_audio(true).has_audio);
    }

    #[test]
    fn test_transition_parse_name_and_duration() {
        let transition = Transition::parse("wipeleft:750").unwrap();
        assert_eq!(transition.name, "wipeleft");
        assert_eq!(transition.duration_ms, 750);
        assert!(transition.params.is_empty());
    }

    #[test]
    fn test_transition_parse_params() {
        let transition = Transition::parse("fade:1000:easing=linear:color=black").unwrap();
        assert_eq!(transition.params.get("easing").map(String::as_str), Some("linear"));
        assert_eq!(transition.params.get("color").map(String::as_str), Some("black"));
        assert_eq!(transition.to_string(), "fade:1000:color=black:easing=linear");
    }

    #[test]
    fn test_transition_parse_invalid() {
        assert!(matches!(
            Transition::parse("fade"),
            Err(DomainError::InvalidTransitionSpec(_))
        ));
        assert!(matches!(
            Transition::parse(":500"),
            Err(DomainError::InvalidTransitionSpec(_))
        ));
        assert!(matches!(
            Transition::parse("fade:abc"),
            Err(DomainError::InvalidDuration(_))
        ));
        assert!(matches!(
            Transition::parse("fade:500:oops"),
            Err(DomainError::InvalidTransitionSpec(_))
        ));
    }

    #[test]
    fn test_transition_default_name_in_toml() {
        let transition: Transition = toml::from_str("duration_ms = 400").unwrap();
        assert_eq!(transition.name, DEFAULT_TRANSITION_NAME);
        assert_eq!(transition.duration_ms, 400);
    }

    #[test]
    fn test_spec_per_boundary_overrides_global() {
        let spec = TransitionSpec::per_boundary(vec![
            Transition::new("wipeleft", 500),
            Transition::new("dissolve", 800),
        ])
        .with_global(Some(Transition::new("fade", 1_000)));

        assert_eq!(spec.at(0).map(|t| t.name.as_str()), Some("wipeleft"));
        assert_eq!(spec.at(1).map(|t| t.duration_ms), Some(800));
        assert_eq!(spec.at(5).map(|t| t.name.as_str()), Some("fade"));
    }

    #[test]
    fn test_spec_validate() {
        let uniform = TransitionSpec::uniform(Transition::new("fade", 1_000));
        assert!(uniform.validate(5).is_ok());

        // A single clip needs no transition at all.
        assert!(TransitionSpec::default().validate(1).is_ok());

        assert!(matches!(
            TransitionSpec::default().validate(2),
            Err(DomainError::InvalidTransitionSpec(_))
        ));

        let short = TransitionSpec::per_boundary(vec![Transition::new("fade", 500)]);
        assert!(matches!(
            short.validate(3),
            Err(DomainError::InvalidTransitionSpec(_))
        ));

        let zero = TransitionSpec::uniform(Transition::new("fade", 0));
        assert!(matches!(zero.validate(2), Err(DomainError::InvalidDuration(_))));
    }

    #[test]
    fn test_position_classify() {
        assert_eq!(Position::classify(0, 1), Position::Only);
        assert_eq!(Position::classify(0, 3), Position::First);
        assert_eq!(Position::classify(1, 3), Position::Middle);
        assert_eq!(Position::classify(2, 3), Position::Last);

        assert!(!Position::First.has_begin());
        assert!(Position::First.has_end());
        assert!(Position::Middle.has_begin() && Position::Middle.has_end());
        assert!(Position::Last.has_begin());
        assert!(!Position::Last.has_end());
        assert!(!Position::Only.has_begin() && !Position::Only.has_end());
    }

    #[test]
    fn test_fragment_rejects_unbounded_range() {
        let err = Fragment::new(
            FragmentKind::Base,
            &clip(3, 5_000),
            None,
            None,
            PathBuf::from("/work/3.mp4"),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            DomainError::InvalidFragment {
                clip_index: 3,
                kind: FragmentKind::Base,
                ..
            }
        ));
    }

    #[test]
    fn test_fragment_rejects_empty_and_overlong_range() {
        let source = clip(0, 5_000);
        let out = PathBuf::from("/work/0.mp4");

        assert!(Fragment::new(FragmentKind::Base, &source, Some(2_000), Some(2_000), out.clone()).is_err());
        assert!(Fragment::new(FragmentKind::End, &source, Some(5_000), None, out.clone()).is_err());
        assert!(Fragment::new(FragmentKind::Base, &source, None, Some(6_000), out).is_err());
    }

    #[test]
    fn test_fragment_lengths() {
        let source = clip(0, 10_000);

        let middle = Fragment::new(
            FragmentKind::Base,
            &source,
            Some(1_000),
            Some(9_000),
            PathBuf::from("/work/0.mp4"),
        )
        .unwrap();
        assert_eq!(middle.bounds(10_000), (1_000, 9_000));
        assert_eq!(middle.duration_ms(10_000), 8_000);
        assert_eq!(middle.trim_length_ms(), Some(8_000));

        let tail = Fragment::new(
            FragmentKind::End,
            &source,
            Some(9_000),
            None,
            PathBuf::from("/work/0.end.mp4"),
        )
        .unwrap();
        assert_eq!(tail.duration_ms(10_000), 1_000);
        assert_eq!(tail.trim_length_ms(), None);
    }

    #[test]
    fn test_trim_fragments_order() {
        let clips = vec![clip(0, 10_000), clip(1, 8_000), clip(2, 12_000)];
        let plan = SegmentationPlanner::new("/work")
            .plan(&clips, &TransitionSpec::uniform(Transition::new("fade", 1_000)))
            .unwrap();

        let names: Vec<String> = plan
            .trim_fragments()
            .iter()
            .map(|fragment| {
                fragment
                    .output()
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();

        assert_eq!(
            names,
            vec![
                "0.mp4",
                "0.end.mp4",
                "1.begin.mp4",
                "1.mp4",
                "1.end.mp4",
                "2.begin.mp4",
                "2.mp4",
            ]
        );
    }

    #[test]
    fn test_fragment_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&FragmentKind::Begin).unwrap(), "\"begin\"");
        assert_eq!(FragmentKind::End.to_string(), "end");
    }
}

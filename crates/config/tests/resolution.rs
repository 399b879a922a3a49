//! Resolver integration tests: reference contract, overrides, namespace and
//! error context.

use std::collections::BTreeMap;
use std::time::Duration;

use obsbox_config::{
    ConfigError, MetricType, RawConfig, ResetConfig, ResolveErrorKind, TransformConfig, load_str,
    resolve,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

/// Resolve YAML without the structural pre-checks of `parse_str`.
fn resolve_yaml(yaml: &str) -> Result<obsbox_config::Config, ConfigError> {
    let raw: RawConfig = serde_yaml::from_str(yaml).expect("test YAML parses");
    resolve(raw)
}

const SHARED: &str = r"
templates:
  clocks:
    second: {type: periodic, interval: 1s}
  sources:
    random:
      type: random_int
      min: 1
      max: 10
      clock: {instance: tick}
    clockless: {type: random_int}
  values:
    total:
      source: {instance: src}
      transforms: [accumulate]
  metrics:
    labelled:
      value: {template: total}
      attributes: {team: core, tier: gold}
instances:
  clocks:
    tick: {template: second}
  sources:
    src: {type: random_int, min: 0, max: 10, clock: {instance: tick}}
  values:
    shared_total:
      source: {instance: src}
      transforms: [accumulate]
";

fn with_metrics(metrics: &str) -> String {
    format!("{SHARED}metrics:\n{metrics}")
}

// ---------------------------------------------------------------------------
// Error cases: message and context chain
// ---------------------------------------------------------------------------

#[rstest]
#[case::override_on_instance(
    "  - {name: m, type: gauge, description: d, value: {source: {instance: src, max: 5}}}",
    "cannot override instance source\n  in metric \"m\""
)]
#[case::template_on_instance(
    "  - {name: m, type: gauge, description: d, value: {source: {instance: src, template: random}}}",
    "cannot override instance source\n  in metric \"m\""
)]
#[case::unknown_instance(
    "  - {name: m, type: gauge, description: d, value: {source: {instance: nope}}}",
    "source instance \"nope\" not found\n  in metric \"m\""
)]
#[case::unknown_template(
    "  - {name: m, type: gauge, description: d, value: {template: nope}}",
    "value template \"nope\" not found\n  in metric \"m\""
)]
#[case::empty_reference(
    "  - {name: m, type: gauge, description: d, value: {}}",
    "value must reference instance, template, or provide inline definition\n  in metric \"m\""
)]
#[case::no_value_at_all(
    "  - {name: m, type: gauge, description: d}",
    "value must reference instance, template, or provide inline definition\n  in metric \"m\""
)]
#[case::unknown_metric_type(
    "  - {name: m, type: histogram, description: d, value: {instance: shared_total}}",
    "invalid type: histogram (must be counter or gauge)\n  in metric \"m\""
)]
#[case::empty_description(
    "  - {name: m, type: gauge, description: '', value: {instance: shared_total}}",
    "description required\n  in metric \"m\""
)]
#[case::emptied_source_type(
    "  - {name: m, type: gauge, description: d, value: {source: {template: random, type: ''}}}",
    "value source required\n  in metric \"m\""
)]
#[case::clockless_source(
    "  - {name: m, type: gauge, description: d, value: {source: {template: clockless}}}",
    "clock required in source\n  in metric \"m\""
)]
#[case::inline_clock_without_type(
    "  - {name: m, type: gauge, description: d, value: {source: {type: random_int, clock: {interval: 1s}}}}",
    "clock type required\n  in metric \"m\""
)]
#[case::reserved_attribute(
    "  - {name: m, type: gauge, description: d, value: {instance: shared_total}, attributes: {__name__: x}}",
    "invalid attribute name \"__name__\"\n  in metric \"m\""
)]
#[case::unknown_metric_template(
    "  - {name: m, type: gauge, description: d, template: nope}",
    "metric template \"nope\" not found\n  in metric \"m\""
)]
fn metric_errors(#[case] metrics: &str, #[case] expected: &str) {
    let err = resolve_yaml(&with_metrics(metrics)).unwrap_err();
    assert!(err.as_resolve().is_some(), "not a resolve error: {err:?}");
    assert_eq!(err.to_string(), expected);
}

#[test]
fn nested_template_chain_is_reported_deepest_first() {
    let err = resolve_yaml(
        r"
templates:
  clocks:
    tick: {type: periodic, interval: 1s}
  sources:
    src: {type: random_int, clock: {template: tick}}
  values:
    val:
      source:
        template: src
        clock: {template: tick, interval: 0s}
metrics:
  - {name: m, type: gauge, description: d, value: {template: val}}
",
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "clock interval required\n  in clock template \"tick\"\n  in source template \"src\"\n  in value template \"val\""
    );
    let frames = err.as_resolve().unwrap().frames();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0], "value template \"val\"");
}

#[rstest]
#[case::template_then_instance(
    "templates:\n  clocks:\n    x: {type: periodic, interval: 1s}\ninstances:\n  sources:\n    x: {type: random_int, clock: {template: x}}\n",
    "name \"x\" already used by template clock, cannot reuse for instance source"
)]
#[case::instance_then_template(
    "templates:\n  values:\n    v: {source: {instance: v}}\ninstances:\n  clocks:\n    v: {type: periodic, interval: 1s}\n",
    "name \"v\" already used by instance clock, cannot reuse for template value"
)]
#[case::metric_template_vs_clock(
    "templates:\n  clocks:\n    m: {type: periodic, interval: 1s}\n  metrics:\n    m: {}\n",
    "name \"m\" already used by template clock, cannot reuse for template metric"
)]
fn name_collisions(#[case] sections: &str, #[case] expected: &str) {
    let yaml = format!(
        "{sections}metrics:\n  - {{name: m1, type: gauge, description: d, value: {{source: {{type: random_int, clock: {{type: periodic, interval: 1s}}}}}}}}\n"
    );
    let err = resolve_yaml(&yaml).unwrap_err();
    assert!(matches!(err, ConfigError::NameCollision { .. }));
    assert_eq!(err.to_string(), expected);
}

#[test]
fn expanded_duplicate_names_collide() {
    let err = load_str(
        r"
iterators:
  - {name: i, type: list, values: [a, a]}
instances:
  clocks:
    clk_{i}: {type: periodic, interval: 1s}
metrics:
  - {name: m, type: gauge, description: d, value: {source: {type: random_int, clock: {instance: clk_a}}}}
",
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "name \"clk_a\" already used by instance clock, cannot reuse for instance clock"
    );
}

#[test]
fn definitions_cannot_alias_instances() {
    let yaml = with_metrics(
        "  - {name: unused, type: gauge, description: d, value: {instance: shared_total}}",
    )
    .replace(
        "    shared_total:\n      source: {instance: src}\n      transforms: [accumulate]\n",
        "    shared_total: {instance: other}\n",
    );
    let err = resolve_yaml(&yaml).unwrap_err();
    let resolve_err = err.as_resolve().unwrap();
    assert_eq!(
        resolve_err.kind(),
        &ResolveErrorKind::DefinitionAliasesInstance(obsbox_config::EntityKind::Value)
    );
    assert_eq!(resolve_err.frames(), ["value instance \"shared_total\""]);
}

#[test]
fn definitions_may_only_derive_from_earlier_templates() {
    let err = resolve_yaml(
        r"
templates:
  clocks:
    fast: {template: base, interval: 100ms}
    base: {type: periodic, interval: 1s}
metrics:
  - {name: m, type: gauge, description: d, value: {source: {type: random_int, clock: {template: fast}}}}
",
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "clock template \"base\" not found\n  in clock template \"fast\""
    );
}

// ---------------------------------------------------------------------------
// Successful resolution
// ---------------------------------------------------------------------------

#[test]
fn template_override_touches_only_given_fields() {
    let config = resolve_yaml(&with_metrics(
        "  - {name: m, type: gauge, description: d, value: {source: {template: random, max: 5}}}",
    ))
    .unwrap();
    let source = &config.metrics[0].value.source;
    assert_eq!(source.kind, "random_int");
    assert_eq!(source.min, Some(1));
    assert_eq!(source.max, Some(5));
    assert_eq!(source.clock.interval, Duration::from_secs(1));
    assert_eq!(source.clock_ref.as_deref(), Some("tick"));
    assert_eq!(config.metrics[0].value.source_ref, None);
}

#[test]
fn ref_names_are_set_only_for_instances() {
    let config = resolve_yaml(&with_metrics(
        "  - {name: a, type: counter, description: d, value: {source: {instance: src}}}
  - {name: b, type: gauge, description: d, value: {source: {type: random_int, clock: {template: second}}}}",
    ))
    .unwrap();
    assert_eq!(config.metrics[0].value.source_ref.as_deref(), Some("src"));
    assert_eq!(config.metrics[0].value.source.clock_ref.as_deref(), Some("tick"));
    assert_eq!(config.metrics[1].value.source_ref, None);
    assert_eq!(config.metrics[1].value.source.clock_ref, None);
}

#[test]
fn value_instance_is_returned_verbatim() {
    let config = resolve_yaml(&with_metrics(
        "  - {name: a, type: counter, description: d, value: {instance: shared_total}}",
    ))
    .unwrap();
    assert_eq!(
        config.metrics[0].value,
        config.instances.values["shared_total"]
    );
    assert_eq!(config.metrics[0].value.source_ref.as_deref(), Some("src"));
}

#[test]
fn list_overrides_replace_instead_of_merging() {
    let config = resolve_yaml(&with_metrics(
        "  - {name: a, type: gauge, description: d, value: {template: total, transforms: [], reset: on_read}}",
    ))
    .unwrap();
    let value = &config.metrics[0].value;
    assert_eq!(value.transforms, Vec::<TransformConfig>::new());
    assert_eq!(value.reset, Some(ResetConfig::new("on_read", 0)));
}

#[test]
fn metric_attributes_replace_template_attributes() {
    let config = resolve_yaml(&with_metrics(
        "  - {name: a, type: counter, description: d, template: labelled}
  - {name: b, type: counter, description: d, template: labelled, attributes: {zone: eu}}",
    ))
    .unwrap();
    assert_eq!(
        config.metrics[0].attributes,
        BTreeMap::from([
            ("team".to_owned(), "core".to_owned()),
            ("tier".to_owned(), "gold".to_owned()),
        ])
    );
    assert_eq!(
        config.metrics[1].attributes,
        BTreeMap::from([("zone".to_owned(), "eu".to_owned())])
    );
    assert_eq!(config.metrics[1].value.transforms, vec![TransformConfig::new("accumulate")]);
    assert_eq!(config.metrics[1].kind, MetricType::Counter);
}

#[test]
fn templates_are_discarded_and_instances_kept() {
    let config = resolve_yaml(&with_metrics(
        "  - {name: a, type: counter, description: d, value: {instance: shared_total}}",
    ))
    .unwrap();
    let clocks: Vec<&str> = config.instances.clocks.keys().map(String::as_str).collect();
    assert_eq!(clocks, vec!["tick"]);
    assert_eq!(config.instances.sources.len(), 1);
    assert_eq!(config.instances.values.len(), 1);
    assert_eq!(config.instances.clocks["tick"].kind, "periodic");
}

#[test]
fn protocol_specific_names_are_kept() {
    let config = resolve_yaml(&with_metrics(
        "  - name: {prometheus: http_requests_total, otel: http.requests}
    type: counter
    description: d
    value: {instance: shared_total}",
    ))
    .unwrap();
    assert_eq!(config.metrics[0].prometheus_name, "http_requests_total");
    assert_eq!(config.metrics[0].otel_name, "http.requests");
}

#[test]
fn resolved_config_prints_as_yaml() {
    let config = resolve_yaml(&with_metrics(
        "  - {name: a, type: counter, description: d, value: {instance: shared_total}}",
    ))
    .unwrap();
    let yaml = serde_yaml::to_string(&config).unwrap();
    assert!(yaml.contains("prometheus_name: a"));
    assert!(yaml.contains("interval: 1s"));
    assert!(yaml.contains("source_ref: src"));
}

/// System prompt for generating BPMN 2.0 diagrams from a description.
pub const BPMN_SYSTEM_PROMPT: &str = r#"You are an expert BPMN 2.0 process analyst and modeler.
Interpret the user's description of a business process and produce a valid BPMN 2.0 XML document.

Rules:
1. Output only the raw XML. No Markdown code fences, explanations or other text.
2. The XML must be valid BPMN 2.0.
3. Use descriptive ids, e.g. "StartEvent_OrderReceived" or "Task_ValidateOrder".
4. Every flow node must be connected by sequence flows.
5. Give every task, event and gateway a "name" attribute.
6. If the description is vague, infer a conventional business flow.
7. Prefer start and end events, user, service and script tasks, exclusive
   and parallel gateways, and sequence flows.

Produce the semantic <bpmn:process> part. Diagram interchange (<bpmndi:BPMNDiagram>)
may be omitted; the editor lays out diagrams that lack it.
"#;

/// Remove Markdown code fences (```` ``` ```` and ```` ```xml ````) and
/// surrounding whitespace from a model response.
pub fn strip_code_fences(response: &str) -> String {
    response
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fences() {
        let fenced = "```xml\n<definitions>\n  <process/>\n</definitions>\n```\n";
        assert_eq!(strip_code_fences(fenced), "<definitions>\n  <process/>\n</definitions>");
    }

    #[test]
    fn unfenced_is_trimmed() {
        assert_eq!(strip_code_fences("  <definitions/>\n"), "<definitions/>");
    }
}

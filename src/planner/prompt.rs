//! Instruction templates sent to the completion service.
//!
//! Both templates ask for bare JSON. They deliberately avoid spelling out
//! literal fence markers so the model is not primed to emit them.

pub(crate) fn build_extraction_prompt(query: &str) -> String {
    format!(
        r#"You are an intelligent text analysis assistant. Your task is to extract the core 'goal' and the 'timeline' from the user's request and return it as a JSON object.

Analyze the user request: "{query}"

Extract the information into a valid JSON object with exactly two keys: "goal" and "timeline".
- The "goal" should be a clear, concise action phrase describing the main objective.
- The "timeline" should be the duration or deadline mentioned.
- If no specific timeline is mentioned, set the value of "timeline" to "unspecified".

IMPORTANT: ONLY output the JSON object with goal and timeline. Do not include any other text, explanations, or markdown code fences.
"#
    )
}

pub(crate) fn build_planning_prompt(goal: &str, timeline: &str) -> String {
    format!(
        r#"You are an expert project manager AI. Your task is to break down a user's goal into a complete, actionable plan.

Goal: "{goal}"
Timeline: "{timeline}"

Generate a detailed project plan in a valid JSON format. The JSON must be an array of objects, where each object represents a major phase of the project.

Each phase object must contain:
- "phase_name": A string name for the phase (e.g., "Phase 1: Research and Planning").
- "tasks": An array of task objects.

Each task object must contain:
- "task_id": A unique integer identifier for the task (e.g., 1, 2, 3).
- "task_name": A concise string name for the task.
- "description": A brief one-sentence description of the task.
- "start_day": An integer representing the start day of the task.
- "end_day": An integer representing the end day of the task, never earlier than its start day.
- "dependencies": An array of integers, listing the 'task_id's of tasks that must be completed before this one can start. An empty array [] means no dependencies.

IMPORTANT RULES:
1. The entire plan must logically fit within the given timeline.
2. Ensure dependencies are logical. A task cannot depend on a task that starts later.
3. Provide a complete breakdown covering all key aspects of the goal.
4. ONLY output the JSON array. Do not include any other text, explanations, or markdown code fences.
"#
    )
}

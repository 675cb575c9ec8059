pub mod generation; // LLM client, prompts and the generate/regen/patch loop
pub mod normalize; // goal-mode policy, equipment, diagram, youth guards
pub mod quality; // scorer + fix decision

/// Instruction used when the configuration does not override it.
pub const DEFAULT_SYSTEM_PROMPT: &str = concat!(
    "Você é um assistente que responde perguntas de forma clara, ",
    "direta e precisa em português.\n",
    "\n",
    "Exemplo:\n",
    "Pergunta: Quem inventou a lâmpada?\n",
    "Resposta: Thomas Edison inventou a lâmpada elétrica em 1879.\n",
    "\n",
    "Agora responda a próxima pergunta de forma direta e objetiva, ",
    "com no máximo 2-3 frases curtas.",
);

/// Renders a system + user exchange with the ChatML template and opens the
/// assistant turn, leaving the model free to start with `<think>`.
pub fn build_chat_prompt(system: &str, question: &str) -> String {
    let mut prompt = String::with_capacity(system.len() + question.len() + 64);
    push_turn(&mut prompt, "system", system);
    push_turn(&mut prompt, "user", question);
    prompt.push_str("<|im_start|>assistant\n");
    prompt
}

fn push_turn(prompt: &mut String, role: &str, content: &str) {
    prompt.push_str("<|im_start|>");
    prompt.push_str(role);
    prompt.push('\n');
    prompt.push_str(content);
    prompt.push_str("<|im_end|>\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_chatml_turns() {
        let prompt = build_chat_prompt("be brief", "who was first in space?");
        assert_eq!(
            prompt,
            "<|im_start|>system\nbe brief<|im_end|>\n\
             <|im_start|>user\nwho was first in space?<|im_end|>\n\
             <|im_start|>assistant\n"
        );
    }
}

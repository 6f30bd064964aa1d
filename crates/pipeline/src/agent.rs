//! Role descriptors for the agents in the crew.

/// A role-configured LLM persona.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

impl Agent {
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
        }
    }

    /// Drafts the blog post.
    pub fn creative_writer() -> Self {
        Self::new(
            "Creative Content Writer",
            "To write an engaging, informative, and human-like blog post on a given topic.",
            "You are an expert content creator who specializes in technology and culture. \
             You know how to break down complex topics into simple, engaging narratives \
             that captivate an audience.",
        )
    }

    /// Checks the draft against the brand guidelines and produces the final
    /// approved version.
    pub fn brand_reviewer() -> Self {
        Self::new(
            "Brand Compliance Reviewer",
            "To review a given piece of content, ensure it strictly adheres to brand \
             guidelines, and deliver the final approved version.",
            "You are the guardian of the brand's voice. Your job is to read content and \
             check it for tone, style, and accuracy against the company's brand profile. \
             You are meticulous and have a keen eye for detail.",
        )
    }

    /// Gives the final legal/ethical go or no-go.
    pub fn compliance_officer() -> Self {
        Self::new(
            "Legal and Ethics Compliance Officer",
            "Perform a final legal/ethical/copyright check with a decisive verdict.",
            "You are a detail-oriented compliance expert. Scan text for legal, ethical, \
             and copyright risks and give a final GO / NO-GO.",
        )
    }

    /// System instructions sent with every call this agent makes.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        )
    }
}

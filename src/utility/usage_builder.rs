
use nonempty::NonEmpty;

use crate::utility::traits::ToList;


enum ParameterType {
    Constant,
    Required,
    Optional,
}

struct Parameter {
    name: String,
    param_type: ParameterType,
}

type Usage = Vec<Parameter>;

pub struct UsageBuilder {
    pub triggers: NonEmpty<String>,
    usage: Vec<Usage>,
}

impl UsageBuilder {

    pub fn new(triggers: NonEmpty<String>) -> UsageBuilder {
        UsageBuilder {
            triggers,
            usage: Vec::new(),
        }
    }

    /// Starts an alternative way of calling the command.
    pub fn new_usage(mut self) -> Self {
        self.usage.push(Vec::new());
        self
    }

    fn add_parameters<'a>(mut self, parameter: impl ToList<&'a str>, param_type: fn() -> ParameterType) -> Self {
        if self.usage.is_empty() {
            self.usage.push(Vec::new());
        }
        if let Some(current_usage) = self.usage.last_mut() {
            for name in parameter.to_list().into_iter() {
                current_usage.push(Parameter {
                    name: name.to_string(),
                    param_type: param_type(),
                });
            }
        }
        self
    }

    pub fn add_constant<'a>(self, parameter: impl ToList<&'a str>) -> Self {
        self.add_parameters(parameter, || ParameterType::Constant)
    }

    pub fn add_required<'a>(self, parameter: impl ToList<&'a str>) -> Self {
        self.add_parameters(parameter, || ParameterType::Required)
    }

    pub fn add_optional<'a>(self, parameter: impl ToList<&'a str>) -> Self {
        self.add_parameters(parameter, || ParameterType::Optional)
    }

    fn build_usage(&self, usage: &Usage, prefix: &str) -> String {

        let mut usage_string = format!("{}{}", prefix, self.triggers.head);
        for parameter in usage.iter() {
            match parameter.param_type {
                ParameterType::Constant => {
                    usage_string.push_str(&format!(" {}", parameter.name));
                },
                ParameterType::Required => {
                    usage_string.push_str(&format!(" <{}>", parameter.name));
                },
                ParameterType::Optional => {
                    usage_string.push_str(&format!(" [{}]", parameter.name));
                },
            }
        }
        usage_string
    }

    pub fn build(&self, prefix: &str) -> String {

        // commands without parameters
        if self.usage.is_empty() {
            return format!("{}{}", prefix, self.triggers.head);
        }

        let mut usage_string: String = self.usage
            .iter()
            .map(|usage| self.build_usage(usage, prefix))
            .collect::<Vec<String>>()
            .join("\n");

        // add alternative command names
        if !self.triggers.tail.is_empty() {
            usage_string.push_str(&format!("\nAlternative names: {}", self.triggers.tail.join(", ")));
        }

        usage_string
    }

}

use crate::model::{
    Course, CourseDraft, CourseId, Difficulty, Lesson, LessonId, LessonKind, QuestionId,
    QuizQuestion,
};

use super::CatalogError;

const BLINK_TEMPLATE: &str = "\
void setup() {
  // Set pin 13 as output

}

void loop() {
  // Turn LED on

  // Wait 500ms

  // Turn LED off

  // Wait 500ms

}";

fn course_id(id: &str) -> Result<CourseId, CatalogError> {
    CourseId::new(id).map_err(|_| CatalogError::InvalidId(id.to_string()))
}

fn lesson_id(id: &str) -> Result<LessonId, CatalogError> {
    LessonId::new(id).map_err(|_| CatalogError::InvalidId(id.to_string()))
}

fn theory(id: &str, title: &str, content: &str, xp: u32) -> Result<Lesson, CatalogError> {
    Ok(Lesson::new(lesson_id(id)?, title, content, xp, LessonKind::Theory)?)
}

fn question(
    id: &str,
    prompt: &str,
    options: [&str; 4],
    correct: usize,
    explanation: &str,
) -> Result<QuizQuestion, CatalogError> {
    let id = QuestionId::new(id).map_err(|_| CatalogError::InvalidId(id.to_string()))?;
    Ok(QuizQuestion::new(
        id,
        prompt,
        options.iter().map(ToString::to_string).collect(),
        correct,
        explanation,
    )?)
}

pub(super) fn courses() -> Result<Vec<Course>, CatalogError> {
    Ok(vec![arduino_basics()?, sensors_actuators()?, communication()?])
}

fn arduino_basics() -> Result<Course, CatalogError> {
    let quiz = vec![
        question(
            "q1",
            "Which function runs only once when Arduino starts?",
            ["loop()", "setup()", "begin()", "start()"],
            1,
            "setup() runs once at the beginning, while loop() runs continuously.",
        )?,
        question(
            "q2",
            "What does digitalWrite(13, HIGH) do?",
            [
                "Reads pin 13",
                "Sets pin 13 to 5V",
                "Sets pin 13 to 0V",
                "Sets pin mode",
            ],
            1,
            "digitalWrite(pin, HIGH) sets the pin to 5V (logic high).",
        )?,
        question(
            "q3",
            "Which pin mode is used for reading button input with internal pullup?",
            ["INPUT", "OUTPUT", "INPUT_PULLUP", "PULLUP"],
            2,
            "INPUT_PULLUP enables the internal pullup resistor for reliable button reading.",
        )?,
    ];

    let lessons = vec![
        theory(
            "setup-loop",
            "Setup and Loop Functions",
            include_str!("content/setup-loop.md"),
            50,
        )?,
        theory(
            "digital-io",
            "Digital Input/Output",
            include_str!("content/digital-io.md"),
            75,
        )?,
        Lesson::new(
            lesson_id("blink-practice")?,
            "Practice: Blink LED",
            "Write code to make the built-in LED (pin 13) blink every 500 milliseconds.",
            100,
            LessonKind::Code {
                template: Some(BLINK_TEMPLATE.to_string()),
                expected_output: Some("LED blinks every 500ms".to_string()),
                required_tokens: vec![
                    "pinMode".to_string(),
                    "digitalWrite".to_string(),
                    "delay".to_string(),
                ],
            },
        )?,
        Lesson::new(
            lesson_id("digital-quiz")?,
            "Digital I/O Quiz",
            "Test your knowledge of digital input/output",
            75,
            LessonKind::Quiz { questions: quiz },
        )?,
    ];

    Ok(CourseDraft {
        id: course_id("arduino-basics")?,
        title: "Arduino Fundamentals".to_string(),
        description: "Learn the basics of Arduino programming, from setup() and loop() to digital I/O"
            .to_string(),
        difficulty: Difficulty::Beginner,
        estimated_time: "2 hours".to_string(),
        category: "Programming".to_string(),
        xp_reward: 500,
        prerequisites: Vec::new(),
        lessons,
    }
    .validate()?)
}

fn sensors_actuators() -> Result<Course, CatalogError> {
    let lessons = vec![
        theory(
            "analog-input",
            "Analog Input",
            include_str!("content/analog-input.md"),
            75,
        )?,
        theory(
            "pwm-output",
            "PWM Output",
            include_str!("content/pwm-output.md"),
            75,
        )?,
    ];

    Ok(CourseDraft {
        id: course_id("sensors-actuators")?,
        title: "Sensors & Actuators".to_string(),
        description: "Learn to read sensors and control actuators like servos and motors"
            .to_string(),
        difficulty: Difficulty::Intermediate,
        estimated_time: "3 hours".to_string(),
        category: "Hardware".to_string(),
        xp_reward: 750,
        prerequisites: Vec::new(),
        lessons,
    }
    .validate()?)
}

fn communication() -> Result<Course, CatalogError> {
    let lessons = vec![theory(
        "serial-communication",
        "Serial Communication",
        include_str!("content/serial-communication.md"),
        100,
    )?];

    Ok(CourseDraft {
        id: course_id("communication")?,
        title: "Communication Protocols".to_string(),
        description: "Master Serial, I2C, and SPI communication for connecting multiple devices"
            .to_string(),
        difficulty: Difficulty::Advanced,
        estimated_time: "4 hours".to_string(),
        category: "Communication".to_string(),
        xp_reward: 1000,
        prerequisites: Vec::new(),
        lessons,
    }
    .validate()?)
}

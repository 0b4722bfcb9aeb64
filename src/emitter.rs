use crate::instruction::{ArithmeticOp, Command, Segment};

pub type Program = Vec<Command>;

pub trait ToVmText {
    fn to_vm_text(&self) -> String;
}

impl ToVmText for [Command] {
    fn to_vm_text(&self) -> String {
        let mut text = String::new();
        for command in self.iter() {
            text.push_str(&command.to_string());
            text.push('\n');
        }
        text
    }
}

/// Collects the commands of one class in emission order.
#[derive(Debug, Default)]
pub struct VmWriter {
    program: Program,
}

impl VmWriter {
    pub fn write_push(&mut self, segment: Segment, index: usize) {
        self.program.push(Command::Push(segment, index));
    }

    pub fn write_pop(&mut self, segment: Segment, index: usize) {
        self.program.push(Command::Pop(segment, index));
    }

    pub fn write_arithmetic(&mut self, op: ArithmeticOp) {
        self.program.push(Command::Arithmetic(op));
    }

    pub fn write_label(&mut self, label: &str) {
        self.program.push(Command::Label(label.to_string()));
    }

    pub fn write_goto(&mut self, label: &str) {
        self.program.push(Command::Goto(label.to_string()));
    }

    pub fn write_if(&mut self, label: &str) {
        self.program.push(Command::IfGoto(label.to_string()));
    }

    pub fn write_call(&mut self, name: &str, n_args: usize) {
        self.program.push(Command::Call(name.to_string(), n_args));
    }

    pub fn write_function(&mut self, name: &str, n_locals: usize) {
        self.program.push(Command::Function(name.to_string(), n_locals));
    }

    pub fn write_return(&mut self) {
        self.program.push(Command::Return);
    }

    pub fn finish(self) -> Program {
        self.program
    }
}
